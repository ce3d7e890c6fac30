use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Policy presets a test may ask for, as named by `ContestPolicy`'s
/// constructors.
const PRESETS: [&str; 2] = ["admin_managed", "registration_gated"];

/// Transform an asynchronous test into a synchronous one running against a
/// fresh in-memory server, and inject dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// [`crate::clock::ManualClock`], which drives the server's clock. An optional
/// argument names the contest policy preset, defaulting to `admin_managed`.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the parameters to inject and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Pick the policy preset.
    let preset = match parse_macro_input!(args as Option<Ident>) {
        Some(preset) if PRESETS.iter().any(|known| preset == known) => preset,
        Some(preset) => {
            return syn::Error::new(
                preset.span(),
                format!("Unknown policy preset, expected one of {PRESETS:?}"),
            )
            .into_compile_error()
            .into();
        }
        None => format_ident!("admin_managed"),
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                ["contest_ledger"],
                None,
                None,
            );

            let clock = crate::clock::ManualClock::new(crate::test_support::epoch());
            let rocket = crate::test_support::rocket_for_test(
                crate::model::common::ContestPolicy::#preset(),
                clock.clone(),
            );

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let rocket_client = rocket::local::asynchronous::Client::tracked(rocket)
                    .await
                    .unwrap();
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_clock = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                if let Some(type_ident) = type_path.path.get_ident() {
                    if type_ident == "Client" {
                        if has_client {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                            ));
                        }
                        has_client = true;
                        args.push(quote! { rocket_client });
                        continue;
                    } else if type_ident == "ManualClock" {
                        if has_clock {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `ManualClock`",
                            ));
                        }
                        has_clock = true;
                        args.push(quote! { clock });
                        continue;
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `clock_ident: ManualClock`",
        ));
    }

    Ok(args)
}
