#[cromwell_dashboard_test::test(server)]
fn server_required() -> Result<(), ()> {
  log::info!("running against {:?}", std::env::var("CROMWELL_API_URL"));

  Ok(())
}

#[cromwell_dashboard_test::test]
async fn async_body() -> Result<(), ()> {
  log::info!("async test body");
  log::debug!("async test body");
  log::trace!("async test body");

  Ok(())
}

#[cromwell_dashboard_test::test]
fn sync_body() {
  log::warn!("sync test body");
  assert!(log::log_enabled!(log::Level::Trace));
}
