//! Content-type dispatcher.
//!
//! The registry is assembled once through [`MultiContentFilterBuilder`] and is
//! read-only afterwards, so lookups need no locking.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use url::Url;

use crate::config::{ContentFilterConfig, FallbackPolicy};
use crate::content_type::ContentType;
use crate::error::ContentError;
use crate::filter::{ContentFilter, PassThroughFilter, TextFilter, XhtmlFilter};
use crate::reader::XmlReader;
use crate::stylesheet::Stylesheet;

/// Routes each call to the filter registered for its content type, or to the
/// default filter when none is registered.
pub struct MultiContentFilter {
    filters: HashMap<String, Arc<dyn ContentFilter>>,
    default_filter: Option<Arc<dyn ContentFilter>>,
}

impl MultiContentFilter {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> MultiContentFilterBuilder {
        MultiContentFilterBuilder::default()
    }

    /// The standard registry: `text/plain` and `application/xhtml+xml`, with
    /// the default filter chosen by `config.fallback`.
    #[must_use]
    pub fn from_config(config: &ContentFilterConfig) -> Self {
        let text: Arc<dyn ContentFilter> = Arc::new(TextFilter::new());
        let builder = Self::builder()
            .register_shared(ContentType::Text.mime_type(), Arc::clone(&text))
            .register(
                ContentType::Xhtml.mime_type(),
                XhtmlFilter::new(config.allowed_classes.clone()),
            );

        let builder = match config.fallback {
            FallbackPolicy::PassThrough => builder.default_filter(PassThroughFilter),
            FallbackPolicy::Text => builder.default_shared(text),
            FallbackPolicy::None => builder,
        };
        builder.build()
    }

    /// Strict lookup: the registered filter, else the default.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidContentType` if neither exists.
    pub fn filter_for(&self, content_type: &str) -> Result<&dyn ContentFilter, ContentError> {
        self.resolve(content_type).ok_or_else(|| {
            ContentError::InvalidContentType(format!("Unknown content type {content_type}"))
        })
    }

    fn resolve(&self, content_type: &str) -> Option<&dyn ContentFilter> {
        match self.filters.get(content_type) {
            Some(filter) => Some(filter.as_ref()),
            None => {
                tracing::trace!(content_type, "No filter registered, using default");
                self.default_filter.as_deref()
            }
        }
    }

    /// Registered content types, in no particular order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Whether a default filter is configured.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_filter.is_some()
    }
}

impl Default for MultiContentFilter {
    fn default() -> Self {
        Self::from_config(&ContentFilterConfig::default())
    }
}

impl fmt::Debug for MultiContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.content_types().collect();
        types.sort_unstable();
        f.debug_struct("MultiContentFilter")
            .field("content_types", &types)
            .field("has_default", &self.has_default())
            .finish_non_exhaustive()
    }
}

impl ContentFilter for MultiContentFilter {
    fn prefix(&self, content_type: &str) -> Option<&str> {
        self.resolve(content_type)?.prefix(content_type)
    }

    fn suffix(&self, content_type: &str) -> Option<&str> {
        self.resolve(content_type)?.suffix(content_type)
    }

    fn xml_reader(
        &self,
        base_url: Option<&Url>,
        content_type: &str,
    ) -> Result<Box<dyn XmlReader>, ContentError> {
        self.filter_for(content_type)?.xml_reader(base_url, content_type)
    }

    fn xsl_templates(&self, content_type: &str) -> Option<Arc<dyn Stylesheet>> {
        self.resolve(content_type)?.xsl_templates(content_type)
    }

    fn validate(&self, content_type: &str, content: &mut dyn Read) -> Result<(), ContentError> {
        self.filter_for(content_type)?.validate(content_type, content)
    }
}

/// Assembles an immutable [`MultiContentFilter`].
#[derive(Default)]
pub struct MultiContentFilterBuilder {
    filters: HashMap<String, Arc<dyn ContentFilter>>,
    default_filter: Option<Arc<dyn ContentFilter>>,
}

impl MultiContentFilterBuilder {
    /// Register `filter` for `content_type`, replacing any earlier registration.
    #[must_use]
    pub fn register(
        self,
        content_type: impl Into<String>,
        filter: impl ContentFilter + 'static,
    ) -> Self {
        self.register_shared(content_type, Arc::new(filter))
    }

    /// Register a shared filter for `content_type`.
    #[must_use]
    pub fn register_shared(
        mut self,
        content_type: impl Into<String>,
        filter: Arc<dyn ContentFilter>,
    ) -> Self {
        self.filters.insert(content_type.into(), filter);
        self
    }

    /// Use `filter` for unregistered content types.
    #[must_use]
    pub fn default_filter(self, filter: impl ContentFilter + 'static) -> Self {
        self.default_shared(Arc::new(filter))
    }

    /// Use a shared filter for unregistered content types.
    #[must_use]
    pub fn default_shared(mut self, filter: Arc<dyn ContentFilter>) -> Self {
        self.default_filter = Some(filter);
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> MultiContentFilter {
        MultiContentFilter {
            filters: self.filters,
            default_filter: self.default_filter,
        }
    }
}

impl fmt::Debug for MultiContentFilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiContentFilterBuilder")
            .field("content_types", &self.filters.keys().collect::<Vec<_>>())
            .field("has_default", &self.default_filter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::xhtml::{XHTML_PREFIX, XHTML_SUFFIX};
    use crate::input::InputSource;

    /// Default handler with no markers, reader or stylesheet.
    struct ContentFilterMock;

    impl ContentFilter for ContentFilterMock {
        fn prefix(&self, _: &str) -> Option<&str> {
            None
        }

        fn suffix(&self, _: &str) -> Option<&str> {
            None
        }

        fn xml_reader(
            &self,
            _: Option<&Url>,
            ct: &str,
        ) -> Result<Box<dyn XmlReader>, ContentError> {
            Err(ContentError::InvalidContentType(ct.to_owned()))
        }

        fn xsl_templates(&self, _: &str) -> Option<Arc<dyn Stylesheet>> {
            None
        }

        fn validate(&self, _: &str, _: &mut dyn Read) -> Result<(), ContentError> {
            Ok(())
        }
    }

    fn registry() -> MultiContentFilterBuilder {
        MultiContentFilter::builder()
            .register("text/plain", TextFilter::new())
            .register("application/xhtml+xml", XhtmlFilter::default())
    }

    fn filter() -> MultiContentFilter {
        registry().default_filter(ContentFilterMock).build()
    }

    #[test]
    fn test_validate() {
        let mut content: &[u8] = b"Testing";
        filter().validate("text/plain", &mut content).unwrap();
    }

    #[test]
    fn test_validate_failure() {
        let filter = filter();
        let prefix = filter.prefix("application/xhtml+xml");
        let suffix = filter.suffix("application/xhtml+xml");
        assert_eq!(prefix, Some(XHTML_PREFIX));
        assert_eq!(suffix, Some(XHTML_SUFFIX));

        let mut source = InputSource::framed(prefix, "<br>", suffix);
        let err = filter
            .validate("application/xhtml+xml", source.reader())
            .unwrap_err();
        let (line, _) = err.location().unwrap();
        assert!(line > 0);
    }

    #[test]
    fn test_get_xsl_templates() {
        let filter = filter();
        assert!(filter.xsl_templates("text/plain").is_some());
        assert!(filter.xsl_templates("application/xhtml+xml").is_some());
        assert!(filter.xsl_templates("bogus").is_none());
    }

    #[test]
    fn test_get_xml_reader() {
        let filter = filter();
        let mut reader = filter.xml_reader(None, "text/plain").unwrap();
        let mut builder = crate::handler::TreeBuilder::new();
        reader
            .parse(InputSource::from_text("testing"), &mut builder)
            .unwrap();
        assert_eq!(builder.finish().unwrap().root().text_content(), "testing");
    }

    #[test]
    fn test_default_errors_propagate() {
        let err = filter().xml_reader(None, "bogus").err().unwrap();
        assert!(matches!(err, ContentError::InvalidContentType(_)));
    }

    #[test]
    fn test_no_default_handler() {
        let filter = registry().build();
        assert!(!filter.has_default());
        assert_eq!(filter.prefix("bogus"), None);
        assert!(filter.xsl_templates("bogus").is_none());
        assert!(matches!(
            filter.filter_for("bogus"),
            Err(ContentError::InvalidContentType(_))
        ));
        let mut content: &[u8] = b"x";
        assert!(matches!(
            filter.validate("bogus", &mut content),
            Err(ContentError::InvalidContentType(_))
        ));
    }

    #[test]
    fn test_prefix_is_pure() {
        let filter = filter();
        for ct in ["text/plain", "application/xhtml+xml", "bogus"] {
            assert_eq!(filter.prefix(ct), filter.prefix(ct));
            assert_eq!(filter.suffix(ct), filter.suffix(ct));
        }
    }

    #[test]
    fn test_from_config_fallbacks() {
        let mut config = ContentFilterConfig::default();
        let filter = MultiContentFilter::from_config(&config);
        assert!(filter.xsl_templates("text/markdown").is_some());

        config.fallback = FallbackPolicy::PassThrough;
        let filter = MultiContentFilter::from_config(&config);
        assert!(filter.has_default());
        assert!(filter.xsl_templates("text/markdown").is_none());

        config.fallback = FallbackPolicy::None;
        assert!(!MultiContentFilter::from_config(&config).has_default());
    }

    #[test]
    fn test_content_types() {
        let filter = MultiContentFilter::default();
        let mut types: Vec<&str> = filter.content_types().collect();
        types.sort_unstable();
        assert_eq!(types, vec!["application/xhtml+xml", "text/plain"]);
    }
}
