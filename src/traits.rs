use crate::types::PermissionSet;

/// Anything that can be authorized as an API token, e.g. a token row loaded
/// from storage.
pub trait TokenPermissions {
    /// The token id, used for diagnostics only.
    fn token_id(&self) -> i64;

    /// The permissions granted to the token.
    fn permissions(&self) -> &PermissionSet;
}

impl<T: TokenPermissions + ?Sized> TokenPermissions for &T {
    fn token_id(&self) -> i64 {
        (**self).token_id()
    }

    fn permissions(&self) -> &PermissionSet {
        (**self).permissions()
    }
}
