//! The navigation bar shown at the top of every page.
//!
//! [NavBar] collects the three things the header needs: how many entries are
//! in the visitor's cart, who is logged in, and the category list. It is
//! built by its extractor for each page, re-rendered by the menu toggle
//! endpoint, and kept up to date in the browser by the cart counter event
//! stream.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri, Query, State},
    http::{HeaderMap, request::Parts},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{CurrentUser, Profile},
    cart::{CartItem, CartStore, get_cart_id, get_or_create_cart_id},
    category::{Category, get_all_categories},
    endpoints,
};

const NAV_BAR_ID: &str = "nav-bar";
const CART_COUNTER_EVENT: &str = "cart_counter";

/// A link in the navigation bar.
struct Link {
    url: String,
    title: String,
    is_current: bool,
}

impl Link {
    fn new(url: &str, title: &str, active_endpoint: &str) -> Self {
        Self {
            url: url.to_owned(),
            title: title.to_owned(),
            is_current: url == active_endpoint,
        }
    }

    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

/// The state of the navigation bar for one page view.
#[derive(Debug, Clone, PartialEq)]
pub struct NavBar {
    active_endpoint: String,
    active_menu: bool,
    counter: usize,
    profile: Option<Profile>,
    categories: Vec<Category>,
    categories_unavailable: bool,
}

impl NavBar {
    /// An empty navigation bar for a guest with an empty cart.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> Self {
        Self {
            active_endpoint: active_endpoint.to_owned(),
            active_menu: false,
            counter: 0,
            profile: None,
            categories: Vec::new(),
            categories_unavailable: false,
        }
    }

    /// Show the number of entries in the latest cart contents.
    pub fn apply_cart(&mut self, items: &[CartItem]) {
        self.counter = items.len();
    }

    pub fn set_profile(&mut self, profile: Option<Profile>) {
        self.profile = profile;
    }

    /// Store the fetched category list as is.
    ///
    /// A failed fetch is logged and the bar shows a placeholder instead of
    /// the category links.
    pub fn load_categories(&mut self, categories: Result<Vec<Category>, Error>) {
        match categories {
            Ok(categories) => {
                self.categories = categories;
                self.categories_unavailable = false;
            }
            Err(error) => {
                tracing::error!("Could not load categories for the navigation bar: {error}");
                self.categories = Vec::new();
                self.categories_unavailable = true;
            }
        }
    }

    pub fn toggle_menu(&mut self) {
        self.active_menu = !self.active_menu;
    }

    pub fn active_menu(&self) -> bool {
        self.active_menu
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_unavailable(&self) -> bool {
        self.categories_unavailable
    }

    fn links(&self) -> (Vec<Link>, Vec<Link>) {
        let active = self.active_endpoint.as_str();

        let mut shop_links = vec![Link::new(endpoints::HOME_VIEW, "Home", active)];
        shop_links.extend(self.categories.iter().map(|category| {
            let url = endpoints::format_endpoint(endpoints::CATEGORY_VIEW, category.id);
            Link::new(&url, category.name.as_ref(), active)
        }));

        let account_links = match &self.profile {
            Some(profile) => {
                let mut links = vec![Link::new(endpoints::PROFILE_VIEW, &profile.name, active)];
                if profile.is_admin() {
                    links.push(Link::new(endpoints::CMS, "CMS", active));
                }
                links.push(Link::new(endpoints::LOG_OUT, "Log out", ""));
                links
            }
            None => vec![
                Link::new(endpoints::LOG_IN_VIEW, "Log in", active),
                Link::new(endpoints::REGISTER_VIEW, "Register", active),
            ],
        };

        (shop_links, account_links)
    }

    pub fn into_html(self) -> Markup {
        let (shop_links, account_links) = self.links();
        let menu_url = format!("{}?open={}", endpoints::NAV_MENU, self.active_menu);
        let menu_style = if self.active_menu {
            "w-full lg:block lg:w-auto"
        } else {
            "hidden w-full lg:block lg:w-auto"
        };
        let cart_link = Link::new(endpoints::CART_VIEW, "Cart", &self.active_endpoint);
        let cart_style = if cart_link.is_current {
            "flex items-center gap-2 py-2 px-3 text-blue-700 dark:text-blue-500"
        } else {
            "flex items-center gap-2 py-2 px-3 text-gray-900 hover:text-blue-700
            dark:text-white lg:dark:hover:text-blue-500"
        };

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav id=(NAV_BAR_ID) class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::HOME_VIEW)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        img
                            src="/static/favicon-128x128.png"
                            alt="Storefront Logo"
                            class="h-8"
                        ;

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Storefront"
                        }
                    }

                    div class="flex items-center lg:order-2 gap-2"
                    {
                        a
                            href=(cart_link.url)
                            class=(cart_style)
                            aria-current=[cart_link.is_current.then_some("page")]
                        {
                            (cart_link.title)

                            span
                                hx-ext="sse"
                                sse-connect=(endpoints::NAV_CART_COUNTER)
                                sse-swap=(CART_COUNTER_EVENT)
                            {
                                (cart_counter_view(self.counter))
                            }
                        }

                        button
                            type="button"
                            hx-get=(menu_url)
                            hx-target={"#" (NAV_BAR_ID)}
                            hx-swap="outerHTML"
                            aria-controls="navbar-menu"
                            aria-expanded=(self.active_menu)
                            class="inline-flex items-center p-2 w-10 h-10 justify-center
                            text-sm text-gray-500 rounded-lg lg:hidden hover:bg-gray-100
                            dark:text-gray-400 dark:hover:bg-gray-700"
                        {
                            span class="sr-only" { "Open main menu" }
                            "☰"
                        }
                    }

                    div id="navbar-menu" class=(menu_style)
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in shop_links {
                                li { (link.into_html()) }
                            }

                            @if self.categories_unavailable {
                                li
                                    class="py-2 px-3 text-gray-500 dark:text-gray-400 lg:p-0"
                                    data-categories-unavailable
                                {
                                    "Categories unavailable"
                                }
                            }

                            @for link in account_links {
                                li { (link.into_html()) }
                            }
                        }
                    }
                }
            }
        )
    }
}

fn cart_counter_view(counter: usize) -> Markup {
    html!(
        span
            id="cart-counter"
            class="inline-flex items-center justify-center min-w-5 h-5 px-1 \
            text-xs font-semibold text-white bg-blue-600 rounded-full"
        {
            (counter)
        }
    )
}

/// The path of the page the visitor is looking at.
///
/// HTMX requests hit API routes, so the `HX-Current-URL` header is used for
/// those.
fn active_path(uri: &axum::http::Uri, headers: &HeaderMap) -> String {
    if !endpoints::is_api_path(uri.path()) {
        return uri.path().to_owned();
    }

    headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
        .and_then(|current_url| current_url.parse::<axum::http::Uri>().ok())
        .map(|current_url| current_url.path().to_owned())
        .unwrap_or_default()
}

impl FromRequestParts<AppState> for NavBar {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Inside a nested router the request URI has the prefix stripped.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let mut nav_bar = NavBar::new(&active_path(&uri, &parts.headers));

        let Ok(CurrentUser(profile)) = CurrentUser::from_request_parts(parts, state).await;
        nav_bar.set_profile(profile);

        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        if let Some(cart_id) = get_cart_id(&jar) {
            match state.cart_store.items(cart_id) {
                Ok(items) => nav_bar.apply_cart(&items),
                Err(error) => tracing::error!("Could not load cart {cart_id}: {error}"),
            }
        }

        let categories = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
            .and_then(|connection| get_all_categories(&connection));
        nav_bar.load_categories(categories);

        Ok(nav_bar)
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Whether the menu is open in the page that sent the request.
    #[serde(default)]
    pub open: bool,
}

/// Render the navigation bar with the menu toggled.
pub async fn get_nav_menu(mut nav_bar: NavBar, Query(query): Query<MenuQuery>) -> Response {
    if query.open {
        nav_bar.toggle_menu();
    }
    nav_bar.toggle_menu();

    nav_bar.into_html().into_response()
}

/// An event stream that sends the cart counter every time the visitor's cart
/// changes.
///
/// Visitors without a cart get one, so that the stream and later additions
/// agree on which cart to watch. The cart subscription is dropped when the
/// client disconnects.
pub async fn get_cart_counter_stream(
    State(cart_store): State<CartStore>,
    jar: PrivateCookieJar,
) -> Response {
    let (jar, cart_id) = get_or_create_cart_id(jar);

    let mut subscription = match cart_store.subscribe(cart_id) {
        Ok(subscription) => subscription,
        Err(error) => {
            tracing::error!("Could not subscribe to cart {cart_id}: {error}");
            return error.into_response();
        }
    };

    let stream = async_stream::stream! {
        let counter = subscription.current().len();
        yield Ok::<_, Infallible>(counter_event(counter));

        while let Ok(items) = subscription.changed().await {
            yield Ok(counter_event(items.len()));
        }
    };

    (jar, Sse::new(stream).keep_alive(KeepAlive::default())).into_response()
}

fn counter_event(counter: usize) -> Event {
    Event::default()
        .event(CART_COUNTER_EVENT)
        .data(cart_counter_view(counter).into_string())
}
