//! Type remapping inside descriptors and generic signatures.
//!
//! All functions take the type-name translation as a closure so they can be driven by a
//! single stage's [`crate::mapping::TypeTable`] during composition or by a full
//! [`crate::Remapper`] at run time.
//!
//! ```rust
//! use jremap::mapping::descriptor::{map_descriptor, map_signature};
//!
//! let rename = |name: &str| if name == "a" { "net/Widget".to_string() } else { name.to_string() };
//!
//! assert_eq!(map_descriptor("(La;[[La;I)La;", rename), "(Lnet/Widget;[[Lnet/Widget;I)Lnet/Widget;");
//! assert_eq!(
//!     map_signature("Ljava/util/List<La;>;", rename).as_deref(),
//!     Some("Ljava/util/List<Lnet/Widget;>;")
//! );
//! ```

/// Maps every class type in a field or method descriptor.
///
/// Primitive types, array brackets and parentheses are copied unchanged. A truncated `L...`
/// reference (missing `;`) is copied verbatim.
pub fn map_descriptor<F>(descriptor: &str, map_type: F) -> String
where
    F: Fn(&str) -> String,
{
    if !descriptor.contains('L') {
        return descriptor.to_string();
    }

    let mut out = String::with_capacity(descriptor.len() + 16);
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let tail = &rest[start + 1..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        out.push_str(&map_type(&tail[..end]));
        out.push(';');
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Maps a type operand that is either an internal name or an array descriptor.
///
/// Operands of `anewarray`, `checkcast`, `instanceof` and `CONSTANT_Class` entries use the
/// internal name for class types and a descriptor for array types.
pub fn map_internal_or_array<F>(name: &str, map_type: F) -> String
where
    F: Fn(&str) -> String,
{
    if name.starts_with('[') {
        map_descriptor(name, map_type)
    } else {
        map_type(name)
    }
}

/// Returns the internal name of a method descriptor's return type, if it is a class type.
#[must_use]
pub fn return_type_name(descriptor: &str) -> Option<&str> {
    let (_, result) = descriptor.rsplit_once(')')?;
    result.strip_prefix('L')?.strip_suffix(';')
}

/// Maps every class type in a generic signature (class, method or field form).
///
/// Nested class suffixes (`Outer<T>.Inner`) are mapped as `Outer$Inner` and re-emitted as the
/// simple name of the mapped result. Returns `None` for signatures containing the `!*`
/// marker emitted by some obfuscators, and for signatures that fail to parse.
pub fn map_signature<F>(signature: &str, map_type: F) -> Option<String>
where
    F: Fn(&str) -> String,
{
    if signature.contains("!*") {
        return None;
    }

    let mut writer = SignatureWriter {
        input: signature.as_bytes(),
        source: signature,
        position: 0,
        out: String::with_capacity(signature.len() + 16),
        map_type: &map_type,
    };
    writer.signature()?;
    Some(writer.out)
}

struct SignatureWriter<'a, F> {
    input: &'a [u8],
    source: &'a str,
    position: usize,
    out: String,
    map_type: &'a F,
}

impl<F> SignatureWriter<'_, F>
where
    F: Fn(&str) -> String,
{
    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn copy(&mut self, byte: u8) -> Option<()> {
        if self.peek()? != byte {
            return None;
        }
        self.out.push(byte as char);
        self.position += 1;
        Some(())
    }

    /// Reads an identifier up to one of `stops`, without copying it.
    fn identifier(&mut self, stops: &[u8]) -> Option<&str> {
        let start = self.position;
        while !stops.contains(&self.peek()?) {
            self.position += 1;
        }
        Some(&self.source[start..self.position])
    }

    fn signature(&mut self) -> Option<()> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }

        if self.peek() == Some(b'(') {
            self.copy(b'(')?;
            while self.peek()? != b')' {
                self.java_type()?;
            }
            self.copy(b')')?;
            if self.peek() == Some(b'V') {
                self.copy(b'V')?;
            } else {
                self.java_type()?;
            }
            while self.peek() == Some(b'^') {
                self.copy(b'^')?;
                self.reference_type()?;
            }
        } else {
            while self.peek().is_some() {
                self.reference_type()?;
            }
        }

        (self.position == self.input.len()).then_some(())
    }

    fn type_parameters(&mut self) -> Option<()> {
        self.copy(b'<')?;
        while self.peek()? != b'>' {
            let name = self.identifier(b":")?.to_string();
            self.out.push_str(&name);
            // class bound may be empty (`T::Ljava/lang/Comparable;`)
            self.copy(b':')?;
            if matches!(self.peek()?, b'L' | b'T' | b'[') {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.copy(b':')?;
                self.reference_type()?;
            }
        }
        self.copy(b'>')
    }

    fn java_type(&mut self) -> Option<()> {
        match self.peek()? {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
                let byte = self.peek()?;
                self.copy(byte)
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Option<()> {
        match self.peek()? {
            b'L' => self.class_type(),
            b'T' => {
                self.copy(b'T')?;
                let name = self.identifier(b";")?.to_string();
                self.out.push_str(&name);
                self.copy(b';')
            }
            b'[' => {
                self.copy(b'[')?;
                self.java_type()
            }
            _ => None,
        }
    }

    fn class_type(&mut self) -> Option<()> {
        self.copy(b'L')?;
        let mut name = self.identifier(b"<.;")?.to_string();
        let mut mapped = (self.map_type)(&name);
        self.out.push_str(&mapped);

        loop {
            match self.peek()? {
                b'<' => self.type_arguments()?,
                b'.' => {
                    self.copy(b'.')?;
                    let inner = self.identifier(b"<.;")?.to_string();
                    name.push('$');
                    name.push_str(&inner);

                    let mapped_inner = (self.map_type)(&name);
                    let simple = mapped_inner
                        .strip_prefix(mapped.as_str())
                        .and_then(|rest| rest.strip_prefix('$'))
                        .unwrap_or(&inner)
                        .to_string();
                    self.out.push_str(&simple);
                    mapped = mapped_inner;
                }
                b';' => return self.copy(b';'),
                _ => return None,
            }
        }
    }

    fn type_arguments(&mut self) -> Option<()> {
        self.copy(b'<')?;
        while self.peek()? != b'>' {
            match self.peek()? {
                b'*' => self.copy(b'*')?,
                b'+' | b'-' => {
                    let byte = self.peek()?;
                    self.copy(byte)?;
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
        }
        self.copy(b'>')
    }
}
