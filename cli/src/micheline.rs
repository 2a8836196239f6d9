//! Textual Michelson expressions for octez-client --arg
//!
//! Only the handful of constructors the protocol entrypoints need. Pairs are
//! emitted n-ary; the node's parser right-combs them.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Nat(u64),
    Int(i64),
    String(String),
    Unit,
    None,
    Some(Box<Expr>),
    Left(Box<Expr>),
    Right(Box<Expr>),
    Pair(Vec<Expr>),
    Seq(Vec<Expr>),
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    pub fn some(inner: Expr) -> Self {
        Expr::Some(Box::new(inner))
    }

    pub fn left(inner: Expr) -> Self {
        Expr::Left(Box::new(inner))
    }

    pub fn right(inner: Expr) -> Self {
        Expr::Right(Box::new(inner))
    }

    pub fn pair(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Pair(items.into_iter().collect())
    }

    /// An optional value: `None` or `(Some x)`.
    pub fn option(value: Option<Expr>) -> Self {
        match value {
            Option::Some(inner) => Expr::some(inner),
            Option::None => Expr::None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nat(value) => write!(f, "{}", value),
            Expr::Int(value) => write!(f, "{}", value),
            Expr::String(value) => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Expr::Unit => write!(f, "Unit"),
            Expr::None => write!(f, "None"),
            Expr::Some(inner) => write!(f, "(Some {})", inner),
            Expr::Left(inner) => write!(f, "(Left {})", inner),
            Expr::Right(inner) => write!(f, "(Right {})", inner),
            Expr::Pair(items) => {
                write!(f, "(Pair")?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            Expr::Seq(items) => {
                write!(f, "{{")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {}", item)?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms() {
        assert_eq!(Expr::Nat(42).to_string(), "42");
        assert_eq!(Expr::Int(-7).to_string(), "-7");
        assert_eq!(Expr::Unit.to_string(), "Unit");
        assert_eq!(Expr::string("tz1abc").to_string(), "\"tz1abc\"");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(Expr::string("a\"b").to_string(), "\"a\\\"b\"");
    }

    #[test]
    fn test_options_and_ors() {
        assert_eq!(Expr::option(None).to_string(), "None");
        assert_eq!(
            Expr::option(Some(Expr::string("tz1abc"))).to_string(),
            "(Some \"tz1abc\")"
        );
        assert_eq!(Expr::left(Expr::Unit).to_string(), "(Left Unit)");
    }

    #[test]
    fn test_remove_liquidity_arg_shape() {
        let arg = Expr::pair([
            Expr::string("tz1owner"),
            Expr::Nat(1_000_000),
            Expr::Nat(1_980_000),
            Expr::Nat(99_000),
            Expr::Nat(0),
            Expr::string("2024-01-01T00:00:00Z"),
        ]);
        assert_eq!(
            arg.to_string(),
            "(Pair \"tz1owner\" 1000000 1980000 99000 0 \"2024-01-01T00:00:00Z\")"
        );
    }

    #[test]
    fn test_depositor_whitelist() {
        let whitelist = Expr::right(Expr::Seq(vec![
            Expr::string("tz1abc"),
            Expr::string("tz1def"),
        ]));
        assert_eq!(whitelist.to_string(), "(Right { \"tz1abc\"; \"tz1def\" })");
    }
}
