use std::collections::BTreeMap;
use std::sync::OnceLock;

use html_escape::encode_text;

use super::classify::classify;
use crate::models::LinkStyle;
use crate::scanning::patterns::tag_line;

/// HTML anchor strings for one tag, built the first time the tag is linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMarkup {
    pub href: String,
    /// `<a>` with the pipe-link class.
    pub pipe: String,
    /// `<a>` with the class of the registered style.
    pub plain: String,
}

#[derive(Debug)]
pub struct LinkEntry {
    pub target_file: String,
    pub style: LinkStyle,
    rendered: OnceLock<AnchorMarkup>,
}

/// Percent-encodes `tag` for use as a URL fragment or anchor name.
///
/// Spaces become `+` so hrefs stay byte-identical to the legacy pages.
pub fn fragment(tag: &str) -> String {
    urlencoding::encode(tag).replace("%20", "+")
}

impl LinkEntry {
    pub fn new(target_file: impl Into<String>, style: LinkStyle) -> Self {
        Self {
            target_file: target_file.into(),
            style,
            rendered: OnceLock::new(),
        }
    }

    /// Anchor markup for `tag`, built and cached on first use.
    pub fn markup(&self, tag: &str) -> &AnchorMarkup {
        self.rendered.get_or_init(|| {
            let href = format!("{}.html#{}", self.target_file, fragment(tag));
            let text = encode_text(tag);
            AnchorMarkup {
                pipe: format!(
                    r#"<a href="{href}" class="{}">{text}</a>"#,
                    LinkStyle::Link.css_class()
                ),
                plain: format!(
                    r#"<a href="{href}" class="{}">{text}</a>"#,
                    self.style.css_class()
                ),
                href,
            }
        })
    }

    pub fn is_referenced(&self) -> bool {
        self.rendered.get().is_some()
    }
}

/// A tag entry together with the style it is shown in at one use site.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLink<'a> {
    pub entry: &'a LinkEntry,
    pub style: LinkStyle,
    /// The use site asked for a style other than the registered one.
    pub mismatch: bool,
}

/// Tag table shared read-only by every document of a batch.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, LinkEntry>,
}

impl Registry {
    /// Loads `TAG FILE ...` lines. Lines without two fields are skipped and a
    /// repeated tag keeps its last entry.
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for line in lines {
            let line = line.as_ref();
            match tag_line().captures(line) {
                Some(caps) => {
                    let (tag, file) = (&caps[1], &caps[2]);
                    entries.insert(tag.to_string(), LinkEntry::new(file, classify(tag)));
                }
                None => log::trace!("skipping tag line {line:?}"),
            }
        }
        log::debug!("loaded {} tags", entries.len());
        Self { entries }
    }

    pub fn insert(&mut self, tag: impl Into<String>, target_file: impl Into<String>) {
        let tag = tag.into();
        let style = classify(&tag);
        self.entries.insert(tag, LinkEntry::new(target_file, style));
    }

    pub fn classify(&self, tag: &str) -> LinkStyle {
        classify(tag)
    }

    pub fn resolve(&self, tag: &str) -> Option<&LinkEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Looks up `tag` as used with `requested` style. A pipe request always
    /// wins; any other request keeps the registered style.
    pub fn resolve_link(&self, tag: &str, requested: Option<LinkStyle>) -> Option<ResolvedLink<'_>> {
        let entry = self.entries.get(tag)?;
        let style = match requested {
            Some(LinkStyle::Link) => LinkStyle::Link,
            _ => entry.style,
        };
        let mismatch = requested.is_some_and(|r| r != entry.style && r != LinkStyle::Link);
        Some(ResolvedLink {
            entry,
            style,
            mismatch,
        })
    }

    /// HTML for a reference to `tag`.
    ///
    /// Unknown tags become a styled span when a style was requested and plain
    /// escaped text otherwise.
    pub fn render_link(&self, tag: &str, requested: Option<LinkStyle>) -> String {
        match (self.resolve_link(tag, requested), requested) {
            (Some(link), _) => {
                let markup = link.entry.markup(tag);
                if link.style != LinkStyle::Link {
                    return markup.plain.clone();
                }
                // foo.txt.html#foo.txt points at the top of its own page
                if tag.ends_with(".txt") && link.entry.target_file == tag {
                    return format!(
                        r#"<a href="{tag}.html" class="{}">{}</a>"#,
                        LinkStyle::Link.css_class(),
                        encode_text(tag)
                    );
                }
                markup.pipe.clone()
            }
            (None, Some(style)) => {
                format!(r#"<span class="{}">{}</span>"#, style.css_class(), encode_text(tag))
            }
            (None, None) => encode_text(tag).into_owned(),
        }
    }

    /// Tags whose link markup was never requested.
    pub fn unreferenced(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_referenced())
            .map(|(tag, _)| tag.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
