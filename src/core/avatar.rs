//! Placeholder avatars for people without a usable photo.
//!
//! The output is an inline SVG data URI, so substituting it never triggers
//! another network fetch and can never fail to load.

use crate::core::markup::escape_text;

/// Leading tokens dropped before initials are taken.
pub const HONORIFICS: &[&str] = &["Pr.", "Prof.", "Dr."];

const EMPTY_INITIALS: &str = "?";
const TEXT_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AvatarStyle {
    size: u32,
    font_size: u32,
    background: &'static str,
}

const COORDINATOR_STYLE: AvatarStyle = AvatarStyle {
    size: 150,
    font_size: 48,
    background: "#1B365D",
};

const MEMBER_STYLE: AvatarStyle = AvatarStyle {
    size: 120,
    font_size: 40,
    background: "#D4AF37",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    pub initials: String,
    pub size: u32,
    pub font_size: u32,
    pub background: &'static str,
}

impl AvatarImage {
    pub fn svg(&self) -> String {
        let size = self.size;
        format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{size}' height='{size}' viewBox='0 0 {size} {size}'>\
             <rect fill='{bg}' width='{size}' height='{size}' rx='{radius}'/>\
             <text x='50%' y='50%' fill='{fg}' font-family='Arial,sans-serif' font-size='{font}' \
             font-weight='bold' text-anchor='middle' dominant-baseline='central'>{initials}</text></svg>",
            bg = self.background,
            radius = size / 2,
            fg = TEXT_COLOR,
            font = self.font_size,
            initials = escape_text(&self.initials),
        )
    }

    /// Fully percent-encoded, so it is safe inside any quoted attribute or
    /// inline script string.
    pub fn data_uri(&self) -> String {
        format!("data:image/svg+xml,{}", urlencoding::encode(&self.svg()))
    }
}

pub fn generate(name: &str, is_coordinator: bool) -> AvatarImage {
    let style = if is_coordinator {
        COORDINATOR_STYLE
    } else {
        MEMBER_STYLE
    };

    AvatarImage {
        initials: initials(name),
        size: style.size,
        font_size: style.font_size,
        background: style.background,
    }
}

/// `"Pr. Amina El Idrissi"` -> `"AE"`.
pub fn initials(name: &str) -> String {
    let mut tokens = name.split_whitespace().peekable();
    if tokens.peek().is_some_and(|first| HONORIFICS.contains(first)) {
        tokens.next();
    }

    let leading: String = tokens.filter_map(|t| t.chars().next()).take(2).collect();
    if leading.is_empty() {
        return EMPTY_INITIALS.to_string();
    }
    leading.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_honorific_and_truncates() {
        assert_eq!(initials("Pr. Amina El Idrissi"), "AE");
        assert_eq!(initials("Dr. karim"), "K");
        assert_eq!(initials("Youssef Benali"), "YB");
        assert_eq!(initials("  sara   tazi  "), "ST");
    }

    #[test]
    fn honorific_is_only_stripped_as_leading_token() {
        assert_eq!(initials("Amina Pr. Idrissi"), "AP");
    }

    #[test]
    fn empty_or_honorific_only_names_get_placeholder() {
        assert_eq!(initials(""), "?");
        assert_eq!(initials("   "), "?");
        assert_eq!(initials("Pr."), "?");
    }

    #[test]
    fn non_ascii_initials_are_uppercased() {
        assert_eq!(initials("élodie öztürk"), "ÉÖ");
    }

    #[test]
    fn role_selects_size_and_background() {
        let coordinator = generate("Pr. Amina El Idrissi", true);
        let member = generate("Sara Tazi", false);

        assert_eq!(coordinator.size, 150);
        assert_eq!(coordinator.background, "#1B365D");
        assert_eq!(member.size, 120);
        assert_eq!(member.background, "#D4AF37");
    }

    #[test]
    fn generation_is_deterministic() {
        for (name, role) in [("Sara Tazi", false), ("Pr. Amina El Idrissi", true), ("", false)] {
            let first = generate(name, role);
            let second = generate(name, role);
            assert_eq!(first, second);
            assert_eq!(first.data_uri(), second.data_uri());
        }
    }

    #[test]
    fn data_uri_is_inline_and_quote_free() {
        let uri = generate("O'Brien & Co", false).data_uri();
        assert!(uri.starts_with("data:image/svg+xml,"));
        assert!(!uri.contains('\''));
        assert!(!uri.contains('"'));
        assert!(!uri.contains('<'));
        assert!(!uri.contains('#'));
    }

    #[test]
    fn initials_are_xml_escaped_in_svg() {
        let avatar = generate("& <", false);
        assert!(avatar.svg().contains(">&amp;&lt;</text>"));
    }
}
