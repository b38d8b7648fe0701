mod cache;
mod cached;
mod clock;
mod policy;
pub(crate) mod response;

pub use cache::TokenCache;
pub use cached::{CachedToken, TokenSnapshot};
pub use clock::{Clock, SystemClock};
pub use policy::RefreshPolicy;
