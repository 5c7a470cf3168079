//! `#[rtti_testhelpers::test]`: a `#[test]` that sets up tracing first.

use proc_macro2::TokenStream;
use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    // attributes, visibility and qualifiers in front of `fn`
    struct Preamble {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    // generics, arguments and return type
    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        preamble: Preamble,
        _fn: KFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

impl quote::ToTokens for Preamble {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

/// Test attribute that installs the shared tracing subscriber and enters a
/// span named after the test before running its body.
///
/// ```ignore
/// #[rtti_testhelpers::test]
/// fn property_round_trip() {
///     // tracing output from rtti-core lands under the `test` span
/// }
/// ```
///
/// A different harness attribute can be passed as the argument, e.g.
/// `#[rtti_testhelpers::test(some_harness::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut tokens = item.to_token_iter();
    let parsed = match tokens.parse::<TestFn>() {
        Ok(parsed) => parsed,
        Err(err) => {
            let msg = format!("#[rtti_testhelpers::test] expects a function: {err:?}");
            return quote::quote! { ::core::compile_error!(#msg); }.into();
        }
    };

    let TestFn {
        preamble,
        _fn,
        name,
        signature,
        body,
    } = parsed;

    let harness = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };

    let body = body.0.stream();
    let label = name.to_string();

    quote::quote! {
        #harness
        #preamble fn #name #signature {
            ::rtti_testhelpers::setup();
            let _test_span = ::rtti_testhelpers::enter_test(#label);

            #body
        }
    }
    .into()
}
