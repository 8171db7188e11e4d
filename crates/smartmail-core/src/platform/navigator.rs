//! Page address and top-level navigation.

use url::Url;

/// Errors from leaving the page.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// The host could not open the target.
    #[error("Failed to open {url}: {reason}")]
    Open {
        /// Target URL.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// The host does not allow navigation.
    #[error("Navigation to {0} refused")]
    Refused(String),
}

/// Access to the page's visible address.
pub trait Navigator {
    /// Returns the decoded query parameters of the current address, in order.
    fn query_params(&self) -> Vec<(String, String)>;

    /// Replaces the query parameters without navigating.
    fn replace_query_params(&mut self, params: Vec<(String, String)>);

    /// Performs a full top-level redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot open the URL.
    fn navigate(&mut self, url: &Url) -> Result<(), NavigationError>;
}

/// Rewrites the query string of `url` to exactly `params`.
///
/// An empty list removes the query altogether.
pub fn replace_query(url: &mut Url, params: &[(String, String)]) {
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
}

/// A navigator that only records what happens to the address.
#[derive(Debug, Clone)]
pub struct InMemoryNavigator {
    location: Url,
    navigations: Vec<Url>,
    replacements: usize,
    refuse_navigation: bool,
}

impl InMemoryNavigator {
    /// Creates a navigator sitting at `location`.
    #[must_use]
    pub const fn new(location: Url) -> Self {
        Self {
            location,
            navigations: Vec::new(),
            replacements: 0,
            refuse_navigation: false,
        }
    }

    /// Makes every `navigate` call fail.
    #[must_use]
    pub const fn refusing_navigation(mut self) -> Self {
        self.refuse_navigation = true;
        self
    }

    /// Returns the current address.
    #[must_use]
    pub const fn location(&self) -> &Url {
        &self.location
    }

    /// Returns every URL passed to `navigate`.
    #[must_use]
    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }

    /// Returns how many times the query was replaced.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }
}

impl Navigator for InMemoryNavigator {
    fn query_params(&self) -> Vec<(String, String)> {
        self.location.query_pairs().into_owned().collect()
    }

    fn replace_query_params(&mut self, params: Vec<(String, String)>) {
        replace_query(&mut self.location, &params);
        self.replacements += 1;
    }

    fn navigate(&mut self, url: &Url) -> Result<(), NavigationError> {
        if self.refuse_navigation {
            return Err(NavigationError::Refused(url.to_string()));
        }
        self.navigations.push(url.clone());
        Ok(())
    }
}
