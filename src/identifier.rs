use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The `group:name` key a tag line is filed under.
///
/// The group is empty for tags written without a `group:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TagIdentifier {
    group: String,
    name: String,
}

impl TagIdentifier {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        TagIdentifier {
            group: group.into(),
            name: name.into(),
        }
    }

    /// Split identifier text on its first `:`. Text without a colon has an
    /// empty group.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((group, name)) => TagIdentifier::new(group, name),
            None => TagIdentifier::new("", text),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_group(&self) -> bool {
        !self.group.is_empty()
    }
}

impl fmt::Display for TagIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.group, self.name)
        }
    }
}

impl FromStr for TagIdentifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TagIdentifier::parse(s))
    }
}

impl From<&str> for TagIdentifier {
    fn from(text: &str) -> Self {
        TagIdentifier::parse(text)
    }
}
