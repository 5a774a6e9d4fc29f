//! OpenAPI description of the HTTP API, served at /docs/json

use serde_json::{json, Value};

use crate::models::SERVICE_NAME;

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": json_content(schema_ref("ErrorResponse")),
    })
}

fn paths() -> Value {
    json!({
        "/health": {
            "get": {
                "summary": "Health Check",
                "description": "Check if the service is running",
                "responses": {
                    "200": {
                        "description": "Service is healthy",
                        "content": json_content(json!({
                            "type": "object",
                            "properties": {
                                "status": { "type": "string", "example": "healthy" },
                                "service": { "type": "string", "example": SERVICE_NAME },
                            },
                        })),
                    },
                },
            },
        },
        "/docs/json": {
            "get": {
                "summary": "API Documentation",
                "description": "This document",
                "responses": {
                    "200": { "description": "OpenAPI document" },
                },
            },
        },
        "/api/pack-sizes": {
            "get": {
                "summary": "Get Pack Sizes",
                "description": "Retrieve all configured pack sizes",
                "responses": {
                    "200": {
                        "description": "List of pack sizes",
                        "content": json_content(json!({
                            "type": "object",
                            "properties": {
                                "pack_sizes": { "type": "array", "example": [250, 500, 1000] },
                            },
                        })),
                    },
                    "500": error_response("Pack sizes could not be read"),
                },
            },
            "put": {
                "summary": "Update Pack Sizes",
                "description": "Update the configured pack sizes",
                "requestBody": {
                    "required": true,
                    "content": json_content(schema_ref("UpdatePackSizesRequest")),
                },
                "responses": {
                    "200": {
                        "description": "Pack sizes updated successfully",
                        "content": json_content(json!({
                            "type": "object",
                            "properties": {
                                "message": { "type": "string", "example": "Pack sizes updated successfully" },
                                "pack_sizes": { "type": "array", "example": [250, 500, 1000] },
                            },
                        })),
                    },
                    "400": error_response("Invalid request"),
                },
            },
        },
        "/api/calculate": {
            "post": {
                "summary": "Calculate Pack Distribution",
                "description": "Calculate the optimal pack distribution for a given quantity. \
                    Rules: 1) Only whole packs 2) Minimize total items 3) Minimize number of packs",
                "requestBody": {
                    "required": true,
                    "content": json_content(schema_ref("PackRequest")),
                },
                "responses": {
                    "200": {
                        "description": "Calculation successful",
                        "content": json_content(schema_ref("PackResponse")),
                    },
                    "400": error_response("Invalid request or calculation failed"),
                },
            },
        },
    })
}

fn schemas() -> Value {
    json!({
        "PackRequest": {
            "type": "object",
            "properties": {
                "quantity": {
                    "type": "integer",
                    "description": "Number of items to order",
                    "example": 251,
                    "minimum": 1,
                },
                "pack_sizes": {
                    "type": "array",
                    "description": "Optional custom pack sizes (if not provided, uses configured pack sizes)",
                    "example": [250, 500, 1000],
                },
            },
            "required": ["quantity"],
        },
        "PackResponse": {
            "type": "object",
            "properties": {
                "quantity": { "type": "integer", "description": "Original requested quantity", "example": 251 },
                "total_items": { "type": "integer", "description": "Total items that will be shipped", "example": 500 },
                "total_packs": { "type": "integer", "description": "Total number of packs", "example": 1 },
                "pack_breakdown": { "type": "object", "description": "Breakdown of packs by size", "example": { "500": 1 } },
                "pack_sizes_used": { "type": "array", "description": "Pack sizes that were used for calculation", "example": [250, 500, 1000] },
            },
        },
        "UpdatePackSizesRequest": {
            "type": "object",
            "properties": {
                "pack_sizes": {
                    "type": "array",
                    "description": "Array of pack sizes (positive integers)",
                    "example": [250, 500, 1000, 2000, 5000],
                },
            },
            "required": ["pack_sizes"],
        },
        "ErrorResponse": {
            "type": "object",
            "properties": {
                "error": { "type": "string", "description": "Error message", "example": "Invalid request" },
                "message": { "type": "string", "description": "Detailed error message", "example": "quantity must be greater than 0" },
            },
        },
    })
}

pub fn api_documentation(server_url: &str) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Pack Calculator API",
            "description": "API for calculating optimal pack distributions based on configurable pack sizes",
            "version": "1.0.0",
        },
        "servers": [
            { "url": server_url, "description": "Pack calculator server" },
        ],
        "paths": paths(),
        "components": { "schemas": schemas() },
    })
}
