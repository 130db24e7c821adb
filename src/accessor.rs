//! Accessors identifying exactly one attribute of an entity.
//!
//! Two shapes are supported:
//!
//! - [`Attribute`]: a typed accessor carrying the attribute name and a getter.
//!   Generated by `#[derive(Entity)]` as `{field}_attribute()`, or built with
//!   [`attribute!`]. The copier writes through the entity's descriptor table,
//!   never through the accessor.
//! - [`AccessorExpression`]: an unevaluated textual reference such as
//!   `"age"`, `"person.age"` or `"|person| person.age"`, built from a string or
//!   with [`accessor!`]. It resolves to an attribute name or fails with a
//!   [`ResolutionFailure`].
//!
//! # Examples
//!
//! ```
//! use immutable_entity::accessor::AccessorExpression;
//! use immutable_entity::ResolutionFailure;
//!
//! assert_eq!(AccessorExpression::new("|person| person.age").resolve(), Ok("age"));
//! assert_eq!(AccessorExpression::new("age").resolve(), Ok("age"));
//! assert_eq!(
//!     AccessorExpression::new("person.address.city").resolve(),
//!     Err(ResolutionFailure::NestedPath)
//! );
//! assert_eq!(
//!     AccessorExpression::new("person.age + 1").resolve(),
//!     Err(ResolutionFailure::ComputedExpression)
//! );
//! ```

use crate::error::ResolutionFailure;

/// A typed accessor for one attribute of `T` holding values of type `A`.
///
/// An `Attribute` only reads. Overrides go through the write channel of the
/// descriptor its name resolves to, so the accessor cannot redirect a write
/// to another field.
pub struct Attribute<T, A> {
    name: &'static str,
    getter: fn(&T) -> &A,
}

impl<T, A> Attribute<T, A> {
    /// Creates a typed accessor.
    ///
    /// # Arguments
    ///
    /// * `name` - The attribute name; must match one attribute of `T`
    /// * `getter` - Borrows the attribute from an instance
    #[must_use]
    pub const fn new(name: &'static str, getter: fn(&T) -> &A) -> Self {
        Self { name, getter }
    }

    /// Returns the attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Borrows the attribute from `source`.
    #[must_use]
    pub fn get<'a>(&self, source: &'a T) -> &'a A {
        (self.getter)(source)
    }

    /// Returns the accessor as an unevaluated expression.
    #[must_use]
    pub const fn expression(&self) -> AccessorExpression<'static> {
        AccessorExpression::new(self.name)
    }
}

impl<T, A> Clone for Attribute<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A> Copy for Attribute<T, A> {}

impl<T, A> std::fmt::Debug for Attribute<T, A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Attribute")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An unevaluated reference to one attribute, kept as text until resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorExpression<'a> {
    text: &'a str,
}

impl<'a> AccessorExpression<'a> {
    /// Wraps accessor text without inspecting it.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Returns the text as written.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Resolves the expression to a single attribute name.
    ///
    /// Accepted forms are `field`, `receiver.field`, `|param| param.field` and
    /// `|param: Type| param.field`.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolutionFailure`] describing why the expression is not a
    /// single simple attribute reference.
    pub fn resolve(&self) -> Result<&'a str, ResolutionFailure> {
        let tokens = tokenize(self.text);
        let (parameter, body) = split_closure(&tokens)?;

        let Some(first) = body.first() else {
            return Err(ResolutionFailure::Empty);
        };
        if first.is_literal() {
            let numeric = body
                .iter()
                .all(|token| matches!(token, Token::Number(_) | Token::Dot));
            return Err(if numeric || body.len() == 1 {
                ResolutionFailure::Literal
            } else {
                ResolutionFailure::ComputedExpression
            });
        }

        let (path, rest) = member_path(body);
        if path.is_empty() {
            return Err(ResolutionFailure::ComputedExpression);
        }
        match rest {
            [] => {}
            [Token::OpenParen, ..] => return Err(ResolutionFailure::MethodCall),
            [Token::Dot, Token::Number(_), ..] => return Err(ResolutionFailure::TupleIndex),
            _ => return Err(ResolutionFailure::ComputedExpression),
        }

        let members = match parameter {
            Some(parameter) if path[0] != parameter => {
                return Err(ResolutionFailure::ForeignReceiver);
            }
            None if path.len() == 1 => &path[..],
            _ => &path[1..],
        };

        match members {
            [] => Err(ResolutionFailure::ComputedExpression),
            [member] => Ok(*member),
            _ => Err(ResolutionFailure::NestedPath),
        }
    }
}

impl<'a> From<&'a str> for AccessorExpression<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl std::fmt::Display for AccessorExpression<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Identifier(&'a str),
    Number(&'a str),
    Text,
    Pipe,
    Dot,
    Colon,
    OpenParen,
    Other,
}

impl Token<'_> {
    fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Text | Self::Identifier("true" | "false")
        )
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut characters = text.char_indices().peekable();

    while let Some((start, character)) = characters.next() {
        let token = match character {
            c if c.is_whitespace() => continue,
            c if c.is_alphabetic() || c == '_' => {
                let end = take_while(&mut characters, start + c.len_utf8(), |c| {
                    c.is_alphanumeric() || c == '_'
                });
                Token::Identifier(&text[start..end])
            }
            c if c.is_ascii_digit() => {
                let end = take_while(&mut characters, start + 1, |c| {
                    c.is_ascii_alphanumeric() || c == '_'
                });
                Token::Number(&text[start..end])
            }
            quote @ ('"' | '\'') => {
                let mut escaped = false;
                for (_, c) in characters.by_ref() {
                    match c {
                        '\\' if !escaped => escaped = true,
                        c if c == quote && !escaped => break,
                        _ => escaped = false,
                    }
                }
                Token::Text
            }
            '|' => Token::Pipe,
            '.' => Token::Dot,
            ':' => Token::Colon,
            '(' => Token::OpenParen,
            _ => Token::Other,
        };
        tokens.push(token);
    }

    tokens
}

fn take_while<I>(
    characters: &mut std::iter::Peekable<I>,
    mut end: usize,
    predicate: impl Fn(char) -> bool,
) -> usize
where
    I: Iterator<Item = (usize, char)>,
{
    while let Some(&(index, c)) = characters.peek() {
        if !predicate(c) {
            break;
        }
        end = index + c.len_utf8();
        characters.next();
    }
    end
}

/// Splits `|param| body` (with an optional `: Type`) into parameter and body.
fn split_closure<'t, 'a>(
    tokens: &'t [Token<'a>],
) -> Result<(Option<&'a str>, &'t [Token<'a>]), ResolutionFailure> {
    let [Token::Pipe, rest @ ..] = tokens else {
        return Ok((None, tokens));
    };
    let [Token::Identifier(parameter), rest @ ..] = rest else {
        return Err(ResolutionFailure::ComputedExpression);
    };
    let closing = match rest {
        [Token::Pipe, ..] => 0,
        [Token::Colon, ..] => rest
            .iter()
            .position(|token| *token == Token::Pipe)
            .ok_or(ResolutionFailure::ComputedExpression)?,
        _ => return Err(ResolutionFailure::ComputedExpression),
    };
    Ok((Some(*parameter), &rest[closing + 1..]))
}

/// Reads `identifier(.identifier)*` from the front of `body`.
///
/// Stops before a numeric segment, so tuple indices are left in the rest.
fn member_path<'t, 'a>(body: &'t [Token<'a>]) -> (Vec<&'a str>, &'t [Token<'a>]) {
    let mut path = Vec::new();
    let mut rest = body;

    if let [Token::Identifier(first), tail @ ..] = rest {
        path.push(*first);
        rest = tail;
        while let [Token::Dot, Token::Identifier(segment), tail @ ..] = rest {
            path.push(*segment);
            rest = tail;
        }
    }

    (path, rest)
}

/// Creates a typed [`Attribute`] for a named field of a struct.
///
/// The field must be visible at the call site.
///
/// # Example
///
/// ```
/// use immutable_entity::attribute;
///
/// #[derive(Default)]
/// struct Point { x: i32, y: i32 }
///
/// let x = attribute!(Point, x);
/// assert_eq!(x.name(), "x");
/// assert_eq!(*x.get(&Point { x: 3, y: 4 }), 3);
/// ```
#[macro_export]
macro_rules! attribute {
    ($entity:ty, $field:ident) => {
        $crate::accessor::Attribute::<$entity, _>::new(
            ::core::stringify!($field),
            |source: &$entity| &source.$field,
        )
    };
}

/// Captures an accessor written as Rust tokens as an [`AccessorExpression`].
///
/// The tokens are not evaluated; they are resolved when the expression is used.
///
/// # Example
///
/// ```
/// use immutable_entity::accessor;
///
/// assert_eq!(accessor!(|person| person.age).resolve(), Ok("age"));
/// assert!(accessor!(|person| person.age * 2).resolve().is_err());
/// ```
#[macro_export]
macro_rules! accessor {
    ($($expression:tt)+) => {
        $crate::accessor::AccessorExpression::new(::core::stringify!($($expression)+))
    };
}
