use core::fmt;
use core::str::FromStr;

use crate::error::PathError;

/// A single four-character name segment (`_SB_`, `PCI0`, `_PS3`, ...).
///
/// Segments shorter than four characters are padded with `_`, matching how
/// ASL compilers canonicalize names. Comparison is bytewise, so names are
/// case-significant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameSeg([u8; 4]);

const fn is_lead_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_name_char(b: u8) -> bool {
    is_lead_char(b) || b.is_ascii_digit()
}

impl NameSeg {
    /// Builds a segment from a literal. Panics (at compile time when used in a
    /// `const`) if the literal is not a valid name.
    pub const fn from_static(bytes: &[u8; 4]) -> Self {
        assert!(is_lead_char(bytes[0]), "invalid leading character in name segment");
        let mut i = 1;
        while i < 4 {
            assert!(is_name_char(bytes[i]), "invalid character in name segment");
            i += 1;
        }
        Self(*bytes)
    }

    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::EmptySegment);
        }
        if text.len() > 4 {
            return Err(PathError::SegmentTooLong(text.to_owned()));
        }

        let mut bytes = [b'_'; 4];
        for (i, ch) in text.chars().enumerate() {
            let valid = ch.is_ascii() && {
                let b = ch as u8;
                if i == 0 {
                    is_lead_char(b)
                } else {
                    is_name_char(b)
                }
            };
            if !valid {
                return Err(PathError::InvalidChar {
                    segment: text.to_owned(),
                    ch,
                });
            }
            bytes[i] = ch as u8;
        }
        Ok(Self(bytes))
    }

    /// `stem` truncated to make room for the decimal `ordinal`:
    /// `numbered("DGPU", 1)` is `DGP1`, `numbered("DGPU", 12)` is `DG12`.
    pub fn numbered(stem: &str, ordinal: u32) -> Result<Self, PathError> {
        let digits = ordinal.to_string();
        let keep = 4usize.saturating_sub(digits.len());
        if keep == 0 {
            return Err(PathError::SegmentTooLong(format!("{stem}{digits}")));
        }
        let stem: String = stem.chars().take(keep).collect();
        Self::parse(&format!("{stem}{digits}"))
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        core::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for NameSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for NameSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameSeg({})", self.as_str())
    }
}

impl FromStr for NameSeg {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A hierarchical reference into the namespace.
///
/// Absolute paths start at the root (`\_SB.PCI0`); relative paths are looked
/// up from a scope and may climb with leading `^` markers. A path is only a
/// name: constructing one says nothing about whether the object exists.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacePath {
    absolute: bool,
    parents: usize,
    segments: Vec<NameSeg>,
}

impl NamespacePath {
    /// The root scope (`\`).
    pub fn root() -> Self {
        Self {
            absolute: true,
            parents: 0,
            segments: Vec::new(),
        }
    }

    pub fn absolute(segments: impl IntoIterator<Item = NameSeg>) -> Self {
        Self {
            absolute: true,
            parents: 0,
            segments: segments.into_iter().collect(),
        }
    }

    pub fn relative(segments: impl IntoIterator<Item = NameSeg>) -> Self {
        Self {
            absolute: false,
            parents: 0,
            segments: segments.into_iter().collect(),
        }
    }

    /// Parses `\_SB.PCI0.PEGP`, `_SB.PCI0`, `^^GFX0`, `\_SB/PCI0` and similar.
    ///
    /// Both `.` and `/` separate segments.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PathError::Empty);
        }

        let (absolute, rest) = match text.strip_prefix('\\') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let trimmed = rest.trim_start_matches('^');
        let parents = rest.len() - trimmed.len();
        if absolute && parents > 0 {
            return Err(PathError::ParentPrefixOnAbsolute(text.to_owned()));
        }

        if trimmed.is_empty() {
            if absolute || parents > 0 {
                return Ok(Self {
                    absolute,
                    parents,
                    segments: Vec::new(),
                });
            }
            return Err(PathError::Empty);
        }

        let segments = trimmed
            .split(['.', '/'])
            .map(NameSeg::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            absolute,
            parents,
            segments,
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    /// Number of leading `^` markers on a relative path.
    pub fn parent_prefixes(&self) -> usize {
        self.parents
    }

    pub fn segments(&self) -> &[NameSeg] {
        &self.segments
    }

    /// The final segment (the object's own name), if any.
    pub fn name(&self) -> Option<NameSeg> {
        self.segments.last().copied()
    }

    /// The path of the containing scope. `None` for the root and for bare
    /// parent markers.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        if !parent.absolute && parent.parents == 0 && parent.segments.is_empty() {
            return None;
        }
        Some(parent)
    }

    pub fn join(&self, seg: NameSeg) -> Self {
        let mut out = self.clone();
        out.segments.push(seg);
        out
    }

    /// Appends the segments of a relative path. An absolute `other` replaces
    /// `self` entirely, matching how an absolute reference ignores its scope.
    pub fn join_path(&self, other: &NamespacePath) -> Option<Self> {
        if other.absolute {
            return Some(other.clone());
        }
        let mut out = self.clone();
        for _ in 0..other.parents {
            if out.segments.pop().is_none() {
                if out.absolute {
                    return None;
                }
                out.parents += 1;
            }
        }
        out.segments.extend_from_slice(&other.segments);
        Some(out)
    }

    /// Resolves `self` against an absolute `scope`, producing an absolute
    /// path. Returns `None` if `^` markers climb above the root.
    pub fn anchored_at(&self, scope: &NamespacePath) -> Option<Self> {
        debug_assert!(scope.is_absolute());
        scope.join_path(self)
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("\\")?;
        }
        for _ in 0..self.parents {
            f.write_str("^")?;
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(seg.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespacePath({self})")
    }
}

impl FromStr for NamespacePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
