/// Named block found in the proposed content (class, function, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Declaring keyword, e.g. `class` or `def`
    pub kind: String,
    pub name: String,
    /// Regex locating the declaration line in any text
    pub pattern: String,
}
