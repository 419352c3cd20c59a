pub mod google;

pub use google::{AuthorizationRequest, GoogleProvider};
