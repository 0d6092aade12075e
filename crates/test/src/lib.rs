use proc_macro::TokenStream;
use quote::quote;
use syn::{
  parse::{Parse, ParseStream},
  ItemFn,
};

/// Environment variable naming a live Cromwell server for `server` tests.
const SERVER_URL_ENV: &str = "CROMWELL_API_URL";

fn has_live_server() -> bool {
  std::env::var(SERVER_URL_ENV).map_or(false, |url| !url.trim().is_empty())
}

#[derive(Debug, Default)]
struct Args {
  needs_server: bool,
}

impl Parse for Args {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let ident: Option<syn::Ident> = input.parse()?;
    match ident {
      None => Ok(Self::default()),
      Some(ident) if ident == "server" => Ok(Self { needs_server: true }),
      Some(ident) => Err(syn::Error::new(ident.span(), "expected `server`")),
    }
  }
}

/// Test attribute that installs the dashboard logger before the body runs.
///
/// Async functions become `#[tokio::test]`, sync ones `#[test]`. With
/// `#[cromwell_dashboard_test::test(server)]` the test is ignored unless
/// `CROMWELL_API_URL` was set when the test crate was compiled.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let args = syn::parse_macro_input!(attr as Args);
  let ItemFn {
    attrs,
    vis,
    sig,
    block,
  } = syn::parse_macro_input!(item as ItemFn);

  let harness = if sig.asyncness.is_some() {
    quote! { #[tokio::test] }
  } else {
    quote! { #[test] }
  };

  // Evaluated at expansion time, so it only changes when the test crate is rebuilt
  let ignore = if args.needs_server && !has_live_server() {
    quote! { #[ignore] }
  } else {
    quote! {}
  };

  quote! {
    #(#attrs)*
    #ignore
    #harness
    #vis #sig {
      cromwell_dashboard_logger::init_logger_with_level(log::Level::Trace);

      #block
    }
  }
  .into()
}

#[cfg(test)]
mod tests {
  use super::Args;

  #[test]
  fn test_parse_args() {
    assert!(!syn::parse_str::<Args>("").unwrap().needs_server);
    assert!(syn::parse_str::<Args>("server").unwrap().needs_server);

    let err = syn::parse_str::<Args>("sever").unwrap_err();
    assert_eq!(err.to_string(), "expected `server`");
    assert!(syn::parse_str::<Args>("server, extra").is_err());
  }
}
