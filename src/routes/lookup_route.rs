use std::path::Path;

use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post, web, HttpResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::ExportSettings,
    domain::{parse_phone_numbers, PhoneQuery},
    services::{
        export_artifacts, registry_csv, sanitize_base_name, ExportedArtifacts, Pipeline,
        PipelineOutput,
    },
};

#[derive(Deserialize)]
struct LookupBody {
    phone_numbers: Vec<String>,
    output_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(flatten)]
    output: PipelineOutput,
    artifacts: Option<ExportedArtifacts>,
}

#[derive(MultipartForm)]
struct UploadForm {
    #[multipart(limit = "1MB")]
    file: Bytes,
    output_name: Option<Text<String>>,
}

fn save_artifacts(
    export: &ExportSettings,
    base_name: &str,
    output: &PipelineOutput,
) -> Option<ExportedArtifacts> {
    match export_artifacts(Path::new(&export.output_dir), base_name, output) {
        Ok(artifacts) => Some(artifacts),
        Err(e) => {
            log::error!("Failed to export run {}: {:?}", output.run_id, e);
            None
        }
    }
}

#[post("")]
pub async fn lookup(
    body: web::Json<LookupBody>,
    pipeline: web::Data<Pipeline>,
    export: web::Data<ExportSettings>,
) -> HttpResponse {
    let body = body.into_inner();
    let phones: Vec<PhoneQuery> = body
        .phone_numbers
        .into_iter()
        .filter_map(|p| PhoneQuery::parse(p).ok())
        .collect();

    if phones.is_empty() {
        return HttpResponse::BadRequest().body("No phone numbers given");
    }

    let output = pipeline.run(&phones).await;
    let base_name = sanitize_base_name(body.output_name.as_deref(), &export.default_base_name);
    let artifacts = save_artifacts(&export, &base_name, &output);

    HttpResponse::Ok().json(LookupResponse { output, artifacts })
}

#[post("/upload")]
pub async fn upload(
    MultipartForm(form): MultipartForm<UploadForm>,
    pipeline: web::Data<Pipeline>,
    export: web::Data<ExportSettings>,
) -> HttpResponse {
    let content = String::from_utf8_lossy(&form.file.data);
    let phones = parse_phone_numbers(&content);

    if phones.is_empty() {
        return HttpResponse::BadRequest().body("Uploaded file has no phone numbers");
    }

    let output = pipeline.run(&phones).await;
    let requested_name = form.output_name.map(|name| name.into_inner());
    let base_name = sanitize_base_name(requested_name.as_deref(), &export.default_base_name);
    save_artifacts(&export, &base_name, &output);

    match registry_csv(&output) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(format!(
                    "{}_registry.csv",
                    base_name
                ))],
            })
            .body(csv),
        Err(e) => {
            log::error!("Failed to render csv for run {}: {:?}", output.run_id, e);
            HttpResponse::InternalServerError().body("Failed to render csv")
        }
    }
}
