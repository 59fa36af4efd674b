// Static "meet the developers" table shown under every screen.

/// One entry of the "meet the developers" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Developer {
    pub name: &'static str,
    pub role: &'static str,
    pub profile_url: &'static str,
    /// Photo shipped with the web build, kept for attribution.
    pub photo: &'static str,
}

pub const DEVELOPERS: &[Developer] = &[
    Developer {
        name: "Moses Alvin",
        role: "Software Engineer",
        profile_url: "https://www.linkedin.com/in/alvin-panjaitan",
        photo: "assets/moses.png",
    },
    Developer {
        name: "Justin Christoper",
        role: "AI Engineer",
        profile_url: "https://www.linkedin.com/in/justin-christroper-b48494390/",
        photo: "assets/justin.png",
    },
    Developer {
        name: "Nicholas Salim",
        role: "AI Engineer",
        profile_url: "https://www.linkedin.com/in/nicholas-salim-7759ba326/",
        photo: "assets/nicholas.png",
    },
];

pub const SECTION_TITLE: &str = "meet the developers";
pub const FOOTER: &str = "Group 19 • AOL Artificial Intelligence";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_credit_links_to_a_profile() {
        assert_eq!(DEVELOPERS.len(), 3);
        for dev in DEVELOPERS {
            assert!(dev.profile_url.starts_with("https://"), "{}", dev.name);
            assert!(!dev.role.is_empty());
        }
    }
}
