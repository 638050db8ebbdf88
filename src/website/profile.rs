//! The page showing the logged in user's account details.

use axum::{
    Extension,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    auth::Profile,
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
};

/// Render the profile of the logged in user.
///
/// This handler must sit behind [crate::auth::auth_guard], which places the
/// [Profile] in the request extensions.
pub async fn get_profile_page(
    Extension(profile): Extension<Profile>,
    nav_bar: NavBar,
) -> Response {
    let content = html!(
        (nav_bar.into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            section class="w-full space-y-4"
            {
                h1 class="text-xl font-bold" { "Hello, " (profile.name) }

                dl class="space-y-2"
                {
                    dt class="font-semibold" { "Email" }
                    dd data-email { (profile.email) }

                    dt class="font-semibold" { "Account type" }
                    dd data-role { (profile.role) }
                }

                div class="flex gap-4"
                {
                    a href=(endpoints::CART_VIEW) class=(LINK_STYLE) { "View cart" }

                    @if profile.is_admin() {
                        a href=(endpoints::CMS) class=(LINK_STYLE) { "Manage the store" }
                    }

                    a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" }
                }
            }
        }
    );

    base("Profile", &[], &content).into_response()
}

#[cfg(test)]
mod profile_page_tests {
    use axum::{Router, middleware, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{
        AppState, Role,
        auth::auth_guard,
        endpoints,
        test_utils::{
            assert_valid_html, get_test_state, insert_test_user, log_in_cookie,
            test_log_in_router,
        },
    };

    use super::get_profile_page;

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::PROFILE_VIEW, get(get_profile_page))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .merge(test_log_in_router())
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn text_of(html: &Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("Could not find {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn shows_customer_details() {
        let state = get_test_state();
        insert_test_user(&state, "ada@example.com", "Ada", Role::Customer);
        let server = get_test_server(state);
        let cookie = log_in_cookie(&server, "ada@example.com").await;

        let response = server.get(endpoints::PROFILE_VIEW).add_cookie(cookie).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        assert_eq!(text_of(&html, "h1"), "Hello, Ada");
        assert_eq!(text_of(&html, "[data-email]"), "ada@example.com");
        assert_eq!(text_of(&html, "[data-role]"), "Customer");
        assert!(!response.text().contains("Manage the store"));
    }

    #[tokio::test]
    async fn admins_get_a_link_to_the_cms() {
        let state = get_test_state();
        insert_test_user(&state, "root@example.com", "Root", Role::Admin);
        let server = get_test_server(state);
        let cookie = log_in_cookie(&server, "root@example.com").await;

        let response = server.get(endpoints::PROFILE_VIEW).add_cookie(cookie).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_eq!(text_of(&html, "[data-role]"), "Administrator");
        assert!(response.text().contains("Manage the store"));
    }

    #[tokio::test]
    async fn guests_are_sent_to_log_in() {
        let server = get_test_server(get_test_state());

        let response = server.get(endpoints::PROFILE_VIEW).await;

        response.assert_status_see_other();
        assert!(
            response
                .header("location")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }
}
