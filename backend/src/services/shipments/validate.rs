use actix_web::{web, HttpResponse, Responder};
use freight_common::model::report::ShipmentField;
use freight_common::requests::ValidateShipmentsRequest;
use freight_common::responses::ValidateShipmentsResponse;
use freight_common::validation::validate_shipments;
use log::debug;

pub(crate) async fn process(req: web::Json<ValidateShipmentsRequest>) -> impl Responder {
    HttpResponse::Ok().json(revalidate(req.into_inner()))
}

/// Recomputes the report for the whole batch after an edit.
///
/// Only edits to `shipment_id`, `mode` and `weight_kg` can change the outcome,
/// so an edit to any other column is acknowledged without a report.
fn revalidate(req: ValidateShipmentsRequest) -> ValidateShipmentsResponse {
    if let Some(column) = req.changed_field.as_deref() {
        if ShipmentField::from_name(column).is_none() {
            debug!("Edit to '{}' does not affect validation", column);
            return ValidateShipmentsResponse {
                revalidated: false,
                report: None,
            };
        }
    }

    ValidateShipmentsResponse {
        revalidated: true,
        report: Some(validate_shipments(&req.shipments)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shipments::configure_routes;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use freight_common::model::shipment::{Shipment, WeightKg};

    fn batch() -> Vec<Shipment> {
        vec![
            Shipment {
                shipment_id: "S1".into(),
                mode: Some("air".into()),
                weight_kg: Some(WeightKg::Number(10.0)),
                ..Shipment::default()
            },
            Shipment {
                shipment_id: "S1".into(),
                mode: Some("plane".into()),
                weight_kg: None,
                ..Shipment::default()
            },
        ]
    }

    #[test]
    fn validated_column_triggers_report() {
        let response = revalidate(ValidateShipmentsRequest {
            shipments: batch(),
            changed_field: Some("mode".into()),
        });

        assert!(response.revalidated);
        let report = response.report.unwrap();
        assert_eq!(report.messages.len(), 2);
        assert!(report.has_error(1, ShipmentField::Mode));
    }

    #[test]
    fn other_columns_are_skipped() {
        let response = revalidate(ValidateShipmentsRequest {
            shipments: batch(),
            changed_field: Some("origin_address".into()),
        });

        assert!(!response.revalidated);
        assert!(response.report.is_none());
    }

    #[actix_web::test]
    async fn endpoint_returns_report_json() {
        let app = actix_test::init_service(App::new().service(configure_routes())).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/shipments/validate")
            .set_json(ValidateShipmentsRequest {
                shipments: batch(),
                changed_field: None,
            })
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ValidateShipmentsResponse = actix_test::read_body_json(resp).await;
        let report = body.report.unwrap();
        assert_eq!(report.messages[0], "Duplicate shipment IDs found: S1");
        assert!(report.has_error(0, ShipmentField::ShipmentId));
    }
}
