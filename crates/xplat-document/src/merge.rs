//! Platform-aware document merge.
//!
//! Merges a source document into a destination document in place:
//! - Root attributes: added when missing, overwritten only with `clobber`
//! - Root text: replaced only with `clobber` and non-empty source text
//! - `<platform name="...">` wrappers: children merged as if they were
//!   direct children when `name` matches the platform filter, otherwise
//!   the whole subtree is ignored; the wrapper itself is never copied
//! - Singleton children: merged into the first destination element of the
//!   same qualified name, appended when absent
//! - Repeatable children: appended unless a destination sibling of the same
//!   name carries exactly the same attribute set

use tracing::trace;

use crate::element::Element;

/// Qualified name of the platform overlay wrapper.
pub const PLATFORM_TAG: &str = "platform";

/// Attribute on the overlay wrapper naming the platform it applies to.
pub const PLATFORM_NAME_ATTR: &str = "name";

/// Elements that may occur at most once per nesting level.
pub const SINGLETON_TAGS: &[&str] = &["content", "author", "name", "description"];

/// The set of qualified names treated as singletons during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingletonTags {
    names: Vec<String>,
}

impl Default for SingletonTags {
    fn default() -> Self {
        Self::new(SINGLETON_TAGS.iter().copied())
    }
}

impl SingletonTags {
    /// Build a table from qualified names. Matching is exact: `foo:name`
    /// is not the same tag as `name`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Merge `source` into `dest` with the default singleton table.
pub fn merge_into(source: &Element, dest: &mut Element, platform: &str, clobber: bool) {
    merge_into_with(source, dest, platform, clobber, &SingletonTags::default());
}

/// Merge `source` into `dest` using a caller-supplied singleton table.
///
/// `dest` is mutated in place. The merge has no failure mode; both trees
/// are assumed to be well formed.
pub fn merge_into_with(
    source: &Element,
    dest: &mut Element,
    platform: &str,
    clobber: bool,
    singletons: &SingletonTags,
) {
    let merger = Merger {
        platform,
        clobber,
        singletons,
    };
    merger.merge_element(source, dest);
}

struct Merger<'a> {
    platform: &'a str,
    clobber: bool,
    singletons: &'a SingletonTags,
}

impl Merger<'_> {
    /// Merge attributes, text and children of one element pair.
    fn merge_element(&self, source: &Element, dest: &mut Element) {
        for (key, value) in source.attributes.iter() {
            if self.clobber || !dest.attributes.contains(key) {
                dest.attributes.set(key, value);
            }
        }

        if self.clobber && !source.text.is_empty() {
            dest.text = source.text.clone();
        }

        self.merge_children(&source.children, dest);
    }

    fn merge_children(&self, children: &[Element], dest: &mut Element) {
        for child in children {
            self.merge_child(child, dest);
        }
    }

    fn merge_child(&self, child: &Element, dest: &mut Element) {
        if child.name == PLATFORM_TAG {
            if child.attr(PLATFORM_NAME_ATTR) == Some(self.platform) {
                self.merge_children(&child.children, dest);
            } else {
                trace!(
                    overlay = child.attr(PLATFORM_NAME_ATTR).unwrap_or_default(),
                    platform = self.platform,
                    "skipping platform overlay"
                );
            }
            return;
        }

        if self.singletons.contains(&child.name) {
            match dest.find_mut(&child.name) {
                Some(existing) => self.merge_element(child, existing),
                None => dest.append(child.clone()),
            }
            return;
        }

        let duplicate = dest
            .find_all(&child.name)
            .any(|existing| existing.attributes.same_set(&child.attributes));
        if duplicate {
            trace!(element = %child.name, "skipping duplicate element");
        } else {
            dest.append(child.clone());
        }
    }
}
