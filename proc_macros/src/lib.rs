extern crate proc_macro;

use proc_macro::TokenStream;

mod env_keys;

/// Adds one `&'static str` constant per named field holding the environment
/// variable that configures it, e.g. `client_id` under `#[env_keys("DISCORD")]`
/// becomes `CLIENT_ID = "DISCORD_CLIENT_ID"`.
#[proc_macro_attribute]
pub fn env_keys(attr: TokenStream, item: TokenStream) -> TokenStream {
    env_keys::expand(attr, item)
}
