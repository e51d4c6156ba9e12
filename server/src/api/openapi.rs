//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{events, health, items, payloads};
use crate::domain::provenance::{
    DataModelUi, DeliveryEvent, FeedingEvent, GrowEvent, IncubationEvent, LifecycleEvent,
    NarrativeDetail, SacrificeEvent,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Provenance API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Supply-chain provenance of traced food items"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "items", description = "Item narratives, graphs and record sets"),
        (name = "events", description = "Single-event graphs"),
        (name = "payloads", description = "Payload upload through the connector")
    ),
    paths(
        health::health,
        items::get_item,
        items::get_item_graph,
        items::get_item_record_set,
        events::get_event_graph,
        payloads::upload_payload,
    ),
    components(schemas(
        health::HealthResponse,
        items::ItemResponse,
        payloads::UploadPayloadRequest,
        DataModelUi,
        NarrativeDetail,
        LifecycleEvent,
        IncubationEvent,
        GrowEvent,
        FeedingEvent,
        SacrificeEvent,
        DeliveryEvent,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Provenance API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
