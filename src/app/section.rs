//! Sections of the application a view can be opened for

use std::fmt;

/// User-selectable section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Employees,
    Novelties,
    Advances,
    Calculator,
    Preview,
    Settings,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Employees,
        Section::Novelties,
        Section::Advances,
        Section::Calculator,
        Section::Preview,
        Section::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Employees => "employees",
            Section::Novelties => "novelties",
            Section::Advances => "advances",
            Section::Calculator => "calculator",
            Section::Preview => "preview",
            Section::Settings => "settings",
        }
    }

    /// Resolve a section name. Unknown or empty names select `Employees`.
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == name.trim())
            .unwrap_or_default()
    }
}

impl From<&str> for Section {
    fn from(name: &str) -> Self {
        Section::parse(name)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_sections() {
        for section in Section::ALL {
            assert_eq!(Section::parse(section.as_str()), section);
        }
    }

    #[test]
    fn test_unknown_section_defaults_to_employees() {
        assert_eq!(Section::parse("reports"), Section::Employees);
        assert_eq!(Section::parse(""), Section::Employees);
        assert_eq!(Section::default(), Section::Employees);
    }
}
