//! Which feature sets a path enables.

use serde::{Deserialize, Serialize};

/// Feature sets enabled for a path. Several may apply at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteFeatures {
    /// Admin screens: form loading states and tooltips.
    pub admin: bool,
    /// Article pages: reading progress and share buttons.
    pub article: bool,
    /// The front page.
    pub home: bool,
}

impl RouteFeatures {
    /// Classifies a location path.
    ///
    /// ```
    /// use pagekit::router::RouteFeatures;
    ///
    /// assert!(RouteFeatures::for_path("/yangilik/42-slug").article);
    /// assert!(RouteFeatures::for_path("/index").home);
    /// assert_eq!(RouteFeatures::for_path("/about"), RouteFeatures::default());
    /// ```
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        Self {
            admin: path.contains("/admin"),
            article: path.contains("/yangilik/"),
            home: path == "/" || path == "/index",
        }
    }

    /// Whether no feature set applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.admin || self.article || self.home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let admin = RouteFeatures::for_path("/admin/news/new");
        assert!(admin.admin && !admin.article && !admin.home);

        let both = RouteFeatures::for_path("/admin/yangilik/5");
        assert!(both.admin && both.article);

        assert!(RouteFeatures::for_path("/").home);
        assert!(!RouteFeatures::for_path("/index.html").home);
        assert!(!RouteFeatures::for_path("/yangilik").article);
        assert!(RouteFeatures::for_path("/kategoriya/sport").is_empty());
    }
}
