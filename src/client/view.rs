//! Page state machine for the marketplace client.
//!
//! [`ViewController`] owns the session, the last fetched catalog and a queue
//! of [`Notice`]s; a front end renders whatever it exposes and forwards user
//! actions to its methods.

use super::api::{ApiClient, ApiError, ListingForm};
use super::catalog::ProductCatalog;
use super::contact::whatsapp_link;
use super::session::{Session, SessionStore};
use crate::domain::model::{
    validate_mobile, Product, ProductPatch, ProductStatus, ALL_CATEGORIES, DEFAULT_INSTITUTE,
    PLACEHOLDER_IMAGE_URL,
};
use crate::transport::http::types::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

const NO_DESCRIPTION: &str = "No description provided.";
const FALLBACK_BRANCH: &str = "Student";
const FALLBACK_SELLER: &str = "Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Sell,
    Auth,
    Profile,
}

impl Page {
    fn requires_session(self) -> bool {
        matches!(self, Page::Sell | Page::Profile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Fields of the auth page. `confirm_password`, `branch` and `mobile` are
/// only read in register mode.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub branch: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The item found a buyer; kept in history as sold.
    Sold,
    /// Changed my mind; the listing is deleted.
    Withdrawn,
}

/// What the detail modal shows for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub price_label: String,
    pub category: String,
    pub seller: String,
    pub description: String,
    pub image_url: String,
}

impl ProductDetail {
    fn from_product(product: &Product) -> Self {
        let description = match product.description.trim() {
            "" | "undefined" => NO_DESCRIPTION.to_string(),
            text => text.to_string(),
        };
        Self {
            id: product.id,
            name: product.name.clone(),
            price_label: price_label(product.price),
            category: product.category.clone(),
            seller: non_empty_or(&product.seller_name, FALLBACK_SELLER),
            description,
            image_url: non_empty_or(&product.image_url, PLACEHOLDER_IMAGE_URL),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub username: String,
    /// e.g. `VJTI • Computer`
    pub subtitle: String,
    pub active: Vec<Product>,
    pub sold: Vec<Product>,
}

impl Dashboard {
    fn build(session: &Session, listings: Vec<Product>) -> Self {
        let (active, sold) = listings
            .into_iter()
            .partition(|p| p.status == ProductStatus::Active);
        Self {
            username: session.username.clone(),
            subtitle: format!(
                "{} • {}",
                DEFAULT_INSTITUTE,
                non_empty_or(&session.branch, FALLBACK_BRANCH)
            ),
            active,
            sold,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn sold_count(&self) -> usize {
        self.sold.len()
    }
}

pub fn price_label(price: f64) -> String {
    format!("₹{}", price)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

pub struct ViewController {
    api: ApiClient,
    sessions: SessionStore,
    session: Option<Session>,
    page: Page,
    auth_mode: AuthMode,
    catalog: ProductCatalog,
    dashboard: Option<Dashboard>,
    search: String,
    category: String,
    notices: Vec<Notice>,
}

impl ViewController {
    /// Restores any saved session, shows home and loads the feed.
    pub async fn start(api: ApiClient, sessions: SessionStore) -> Self {
        let session = match sessions.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding unreadable session: {:#}", e);
                None
            }
        };
        let mut controller = Self {
            api,
            sessions,
            session,
            page: Page::Home,
            auth_mode: AuthMode::Login,
            catalog: ProductCatalog::default(),
            dashboard: None,
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            notices: Vec::new(),
        };
        controller.fetch_products("", ALL_CATEGORIES).await;
        controller
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Drains pending notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, kind: NoticeKind, title: &str, text: impl Into<String>) {
        self.notices.push(Notice::new(kind, title, text));
    }

    fn report(&mut self, err: ApiError, fallback: &str) {
        match err {
            ApiError::Status { message, .. } => self.notify(NoticeKind::Error, "Error", message),
            ApiError::Transport(e) => {
                error!("Request to {} failed: {}", self.api.base_url(), e);
                self.notify(NoticeKind::Error, "Error", fallback);
            }
        }
    }

    /// Switches pages. Sell and profile bounce to auth without a session.
    pub async fn show_page(&mut self, page: Page) -> Page {
        if page.requires_session() && self.session.is_none() {
            self.notify(
                NoticeKind::Warning,
                "Access Denied",
                "Please Login to access this feature",
            );
            self.page = Page::Auth;
            return self.page;
        }
        self.page = page;
        if page == Page::Profile {
            self.load_profile().await;
        }
        self.page
    }

    pub fn toggle_auth_mode(&mut self) -> AuthMode {
        self.auth_mode = match self.auth_mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.auth_mode
    }

    /// Login or register depending on the current mode. Returns true on success.
    pub async fn submit_auth(&mut self, form: &AuthForm) -> bool {
        match self.auth_mode {
            AuthMode::Register => self.register(form).await,
            AuthMode::Login => self.login(form).await,
        }
    }

    async fn register(&mut self, form: &AuthForm) -> bool {
        if form.password != form.confirm_password {
            self.notify(NoticeKind::Error, "Error", "Passwords do not match!");
            return false;
        }
        if validate_mobile(&form.mobile).is_err() {
            self.notify(
                NoticeKind::Error,
                "Error",
                "Please enter a valid 10-digit mobile number",
            );
            return false;
        }
        let request = RegisterRequest {
            username: form.username.clone(),
            password: form.password.clone(),
            branch: form.branch.clone(),
            mobile: form.mobile.clone(),
        };
        match self.api.register(&request).await {
            Ok(_) => {
                self.notify(
                    NoticeKind::Success,
                    "Success",
                    "Registration Successful! Please Login.",
                );
                self.auth_mode = AuthMode::Login;
                true
            }
            Err(e) => {
                self.report(e, "Server Connection Failed");
                false
            }
        }
    }

    async fn login(&mut self, form: &AuthForm) -> bool {
        let request = LoginRequest {
            username: form.username.clone(),
            password: form.password.clone(),
        };
        let response = match self.api.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.report(e, "Server Connection Failed");
                return false;
            }
        };
        let session = Session {
            token: response.token,
            username: response.username,
            branch: response.branch,
            mobile: response.mobile,
        };
        self.persist(&session).await;
        self.notify(
            NoticeKind::Success,
            &format!("Welcome, {}!", session.username),
            "",
        );
        info!("Logged in as {}", session.username);
        self.session = Some(session);
        self.page = Page::Home;
        true
    }

    async fn persist(&mut self, session: &Session) {
        if let Err(e) = self.sessions.save(session).await {
            warn!("Failed to persist session: {:#}", e);
        }
    }

    /// Reloads the feed and rebuilds the catalog. Filters are remembered so
    /// later refreshes reuse them.
    pub async fn fetch_products(&mut self, search: &str, category: &str) {
        self.search = search.to_string();
        self.category = category.to_string();
        self.refresh_products().await;
    }

    async fn refresh_products(&mut self) {
        let (search, category) = (self.search.clone(), self.category.clone());
        match self.api.products(&search, &category).await {
            Ok(products) => self.catalog.replace(products),
            Err(e) => self.report(e, "Server Connection Failed"),
        }
    }

    pub fn product_detail(&self, id: Uuid) -> Option<ProductDetail> {
        self.catalog.get(id).map(ProductDetail::from_product)
    }

    /// WhatsApp link for the seller of a catalog item. Without a session the
    /// caller gets a warning and should offer the auth page.
    pub fn contact_seller(&mut self, id: Uuid) -> Option<Url> {
        if self.session.is_none() {
            self.notify(
                NoticeKind::Warning,
                "Login Required",
                "Please login to chat with the seller!",
            );
            return None;
        }
        let (phone, name) = match self.catalog.get(id) {
            Some(p) => (p.contact_phone.clone(), p.name.clone()),
            None => return None,
        };
        match whatsapp_link(Some(&phone), &name) {
            Ok(url) => Some(url),
            Err(e) => {
                self.notify(NoticeKind::Error, "Error", e.to_string());
                None
            }
        }
    }

    /// Posts a listing as the logged-in user.
    pub async fn submit_listing(&mut self, form: &ListingForm) -> bool {
        let Some(session) = self.session.clone() else {
            self.show_page(Page::Sell).await;
            return false;
        };
        match self
            .api
            .add_product(&session.token, &session.username, &session.mobile, form)
            .await
        {
            Ok(_) => {
                self.notify(NoticeKind::Success, "Posted!", "Your item is now live.");
                self.page = Page::Home;
                self.refresh_products().await;
                true
            }
            Err(e) => {
                self.report(e, "Failed to upload item");
                false
            }
        }
    }

    pub async fn load_profile(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match self.api.my_ads(&session.username).await {
            Ok(listings) => self.dashboard = Some(Dashboard::build(&session, listings)),
            Err(e) => self.report(e, "Server Error"),
        }
    }

    pub async fn remove_listing(&mut self, id: Uuid, reason: RemovalReason) -> bool {
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            return false;
        };
        let outcome = match reason {
            RemovalReason::Sold => self.api.mark_sold(&token, id).await,
            RemovalReason::Withdrawn => self.api.delete_product(&token, id).await,
        };
        match outcome {
            Ok(_) => {
                match reason {
                    RemovalReason::Sold => {
                        self.notify(NoticeKind::Success, "Great!", "Item marked as sold.")
                    }
                    RemovalReason::Withdrawn => {
                        self.notify(NoticeKind::Info, "Deleted", "Ad removed permanently.")
                    }
                }
                self.load_profile().await;
                true
            }
            Err(e) => {
                self.report(e, "Server Error");
                false
            }
        }
    }

    pub async fn submit_edit(&mut self, id: Uuid, patch: &ProductPatch) -> bool {
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            return false;
        };
        match self.api.update_product(&token, id, patch).await {
            Ok(_) => {
                self.notify(
                    NoticeKind::Success,
                    "Updated!",
                    "Item details updated successfully.",
                );
                self.load_profile().await;
                true
            }
            Err(e) => {
                self.report(e, "Failed to update item");
                false
            }
        }
    }

    /// Saves mobile/branch; the server rewrites the contact phone on every ad.
    pub async fn submit_profile(&mut self, mobile: &str, branch: &str) -> bool {
        let Some(mut session) = self.session.clone() else {
            return false;
        };
        if validate_mobile(mobile).is_err() {
            self.notify(NoticeKind::Error, "Error", "Mobile number must be 10 digits");
            return false;
        }
        let request = UpdateProfileRequest {
            username: session.username.clone(),
            mobile: mobile.to_string(),
            branch: branch.to_string(),
        };
        match self.api.update_profile(&session.token, &request).await {
            Ok(updated) => {
                session.mobile = updated.mobile;
                session.branch = updated.branch;
                self.persist(&session).await;
                self.session = Some(session);
                self.notify(
                    NoticeKind::Success,
                    "Success",
                    "Profile updated & all your ads are now fixed!",
                );
                self.load_profile().await;
                true
            }
            Err(e) => {
                self.report(e, "Server Error");
                false
            }
        }
    }

    pub async fn logout(&mut self) {
        if let Err(e) = self.sessions.clear().await {
            warn!("Failed to clear session: {:#}", e);
        }
        self.session = None;
        self.dashboard = None;
        self.auth_mode = AuthMode::Login;
        self.page = Page::Home;
    }
}
