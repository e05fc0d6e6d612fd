//! Text encoding of a whole tree, shape included.
//!
//! The tree is written in preorder: `tree := '/' | entry tree tree`, where
//! `/` marks a missing child. How an entry is spelled depends on [`Format`].

use std::fmt::{self, Write};
use std::str::FromStr;

use arrayvec::ArrayString;

use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::node::{Link, Node, Side};
use crate::traverse::thread_subtree;
use crate::ThreadedTree;

const NULL_MARKER: char = '/';
const LENGTH_DELIMITER: char = ':';

/// Entry spelling used by `encode_with` and `decode_with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Key as one decimal digit followed by the value as one character,
    /// e.g. `2x1y//3z//`. Anything wider can't be encoded.
    #[default]
    Compact,
    /// Key and value each written as `<byte length>:<text>`,
    /// e.g. `2:101:x//`. Any `Display` key or value fits.
    Framed,
}

impl Format {
    fn write_entry<K, V>(self, out: &mut String, key: &K, value: &V) -> Result<(), EncodeError>
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        match self {
            Format::Compact => {
                let mut digit = ArrayString::<1>::new();
                let is_digit = write!(digit, "{key}").is_ok()
                    && digit.bytes().next().is_some_and(|b| b.is_ascii_digit());
                if !is_digit {
                    return Err(EncodeError::KeyNotRepresentable);
                }

                let mut ch = ArrayString::<4>::new();
                if write!(ch, "{value}").is_err() || ch.chars().count() != 1 {
                    return Err(EncodeError::ValueNotRepresentable);
                }

                out.push_str(&digit);
                out.push_str(&ch);
            }
            Format::Framed => {
                write_field(out, key);
                write_field(out, value);
            }
        }
        Ok(())
    }
}

fn write_field(out: &mut String, field: &impl fmt::Display) {
    let text = field.to_string();
    out.push_str(&text.len().to_string());
    out.push(LENGTH_DELIMITER);
    out.push_str(&text);
}

impl<K: fmt::Display, V: fmt::Display> ThreadedTree<K, V> {
    /// Encodes with [`Format::Compact`]. An empty tree encodes to `/`.
    pub fn encode(&self) -> Result<String, EncodeError> {
        self.encode_with(Format::Compact)
    }

    /// Encodes the tree in preorder. Only [`Format::Compact`] can fail.
    pub fn encode_with(&self, format: Format) -> Result<String, EncodeError> {
        let mut out = String::new();
        let mut pending = vec![self.root.as_ref().map(Node::shallow_clone)];

        while let Some(slot) = pending.pop() {
            let Some(node) = slot else {
                out.push(NULL_MARKER);
                continue;
            };

            let data = node.get();
            format.write_entry(&mut out, &data.key, &data.value)?;
            pending.push(data.right.child().map(Node::shallow_clone));
            pending.push(data.left.child().map(Node::shallow_clone));
        }

        log::debug!("encoded {} entries into {} bytes", self.length, out.len());
        Ok(out)
    }
}

impl<K: Ord + FromStr, V: FromStr> ThreadedTree<K, V> {
    /// Replaces the tree with one decoded from [`Format::Compact`] input.
    pub fn decode(&mut self, input: &str) -> Result<(), DecodeError> {
        self.decode_with(Format::Compact, input)
    }

    /// Replaces the tree with the decoded one. On error the tree is left
    /// as it was.
    pub fn decode_with(&mut self, format: Format, input: &str) -> Result<(), DecodeError> {
        *self = build(format, input)?;
        log::debug!("decoded {} entries from {} bytes", self.length, input.len());
        Ok(())
    }
}

/// A subtree still to be parsed: where it hangs and the key range it
/// must respect (`lower <= key < upper`).
struct Slot<K, V> {
    parent: Option<(Node<K, V>, Side)>,
    lower: Option<Node<K, V>>,
    upper: Option<Node<K, V>>,
}

impl<K: Ord, V> Slot<K, V> {
    fn admits(&self, key: &K) -> bool {
        let above = self.lower.as_ref().map_or(true, |lower| lower.get().key <= *key);
        let below = self.upper.as_ref().map_or(true, |upper| *key < upper.get().key);
        above && below
    }
}

/// Parses the structure top-down through child links only, then threads it
/// in a separate pass.
fn build<K, V>(format: Format, input: &str) -> Result<ThreadedTree<K, V>, DecodeError>
where
    K: Ord + FromStr,
    V: FromStr,
{
    let mut tree = ThreadedTree::new();
    let mut reader = Reader::new(input);
    let mut slots = vec![Slot {
        parent: None,
        lower: None,
        upper: None,
    }];

    while let Some(slot) = slots.pop() {
        if reader.eat_null()? {
            continue;
        }

        let offset = reader.offset;
        let (key, value) = reader.entry::<K, V>(format)?;
        if !slot.admits(&key) {
            return Err(DecodeError::new(DecodeErrorKind::OutOfOrder, offset));
        }

        let node = Node::leaf(key, value);
        match slot.parent {
            Some((parent, side)) => {
                *parent.get_mut().link_mut(side) = Link::Child(node.shallow_clone());
            }
            None => tree.root = Some(node.shallow_clone()),
        }

        // Left is popped first to keep preorder.
        slots.push(Slot {
            parent: Some((node.shallow_clone(), Side::Right)),
            lower: Some(node.shallow_clone()),
            upper: slot.upper,
        });
        slots.push(Slot {
            parent: Some((node.shallow_clone(), Side::Left)),
            lower: slot.lower,
            upper: Some(node),
        });
    }
    reader.finish()?;

    if let Some(root) = &tree.root {
        thread_subtree(root);
    }
    tree.length = tree.count();
    Ok(tree)
}

struct Reader<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Reader { input, offset: 0 }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.offset)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn eat_null(&mut self) -> Result<bool, DecodeError> {
        match self.peek() {
            None => Err(self.error(DecodeErrorKind::UnexpectedEnd)),
            Some(NULL_MARKER) => {
                self.offset += NULL_MARKER.len_utf8();
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Takes the next character as a string slice.
    fn char_token(&mut self) -> Result<&'a str, DecodeError> {
        let ch = self
            .peek()
            .ok_or_else(|| self.error(DecodeErrorKind::UnexpectedEnd))?;
        let start = self.offset;
        self.offset += ch.len_utf8();
        Ok(&self.input[start..self.offset])
    }

    /// Takes a `<byte length>:<text>` field and returns the text.
    fn framed_field(&mut self) -> Result<&'a str, DecodeError> {
        let digits = self.input[self.offset..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let length: usize = self.input[self.offset..self.offset + digits]
            .parse()
            .map_err(|_| self.error(DecodeErrorKind::InvalidLength))?;
        self.offset += digits;

        match self.peek() {
            None => return Err(self.error(DecodeErrorKind::UnexpectedEnd)),
            Some(LENGTH_DELIMITER) => self.offset += LENGTH_DELIMITER.len_utf8(),
            Some(_) => return Err(self.error(DecodeErrorKind::InvalidLength)),
        }

        let start = self.offset;
        let end = start
            .checked_add(length)
            .ok_or_else(|| self.error(DecodeErrorKind::InvalidLength))?;
        if end > self.input.len() {
            return Err(self.error(DecodeErrorKind::UnexpectedEnd));
        }
        let text = self
            .input
            .get(start..end)
            .ok_or_else(|| self.error(DecodeErrorKind::InvalidLength))?;
        self.offset = end;
        Ok(text)
    }

    fn entry<K: FromStr, V: FromStr>(&mut self, format: Format) -> Result<(K, V), DecodeError> {
        let key_offset = self.offset;
        let key = match format {
            Format::Compact => {
                let token = self.char_token()?;
                if !token.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DecodeError::new(DecodeErrorKind::InvalidKey, key_offset));
                }
                token
            }
            Format::Framed => self.framed_field()?,
        };
        let key = key
            .parse()
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidKey, key_offset))?;

        let value_offset = self.offset;
        let value = match format {
            Format::Compact => self.char_token()?,
            Format::Framed => self.framed_field()?,
        };
        let value = value
            .parse()
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidValue, value_offset))?;

        Ok((key, value))
    }

    fn finish(&self) -> Result<(), DecodeError> {
        if self.offset < self.input.len() {
            return Err(self.error(DecodeErrorKind::TrailingInput));
        }
        Ok(())
    }
}
