use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub about: String,
    pub size: String,
    pub niche: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyField {
    Name,
    About,
    Size,
    Niche,
}

impl CompanyField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "about" => Some(Self::About),
            "size" => Some(Self::Size),
            "niche" => Some(Self::Niche),
            _ => None,
        }
    }
}

impl CompanyProfile {
    pub fn set(&mut self, field: CompanyField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CompanyField::Name => self.name = value,
            CompanyField::About => self.about = value,
            CompanyField::Size => self.size = value,
            CompanyField::Niche => self.niche = value,
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.name, &self.about, &self.size, &self.niche]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{CompanyField, CompanyProfile};

    #[test]
    fn profile_is_complete_only_when_every_field_has_content() {
        let mut profile = CompanyProfile::default();
        profile.set(CompanyField::Name, "Acme Renovations");
        profile.set(CompanyField::About, "Kitchen and bath remodels");
        profile.set(CompanyField::Size, "11-50");
        assert!(!profile.is_complete());

        profile.set(CompanyField::Niche, "   ");
        assert!(!profile.is_complete());

        profile.set(CompanyField::Niche, "construction");
        assert!(profile.is_complete());
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!(CompanyField::parse(" Niche "), Some(CompanyField::Niche));
        assert_eq!(CompanyField::parse("revenue"), None);
    }
}
