use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Identifier of a registrable unit in the dependency graph.
///
/// A token names a provider, controller, injectable, or module. It is derived
/// either from a Rust type (`Token::of::<T>()`) or from an explicit string
/// (`Token::named("DATABASE_URL")`), mirroring how units are declared in
/// descriptors rather than discovered through reflection.
///
/// Tokens are cheap to clone and compare; they back every registry map in the
/// container.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Token(Arc<str>);

impl Token {
    /// Create a token from a type identity.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Arc::from(type_name::<T>()))
    }

    /// Create a token from an explicit name.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Self(Arc::from(name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserService;

    #[test]
    fn type_tokens_are_stable() {
        assert_eq!(Token::of::<UserService>(), Token::of::<UserService>());
        assert_ne!(Token::of::<UserService>(), Token::of::<String>());
    }

    #[test]
    fn named_tokens_compare_by_content() {
        assert_eq!(Token::named("CONFIG"), Token::from("CONFIG"));
        assert_eq!(Token::named("CONFIG").to_string(), "CONFIG");
    }
}
