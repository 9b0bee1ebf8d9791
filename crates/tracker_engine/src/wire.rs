use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracker_core::{Job, JobId, JobStatus, LinkRecord, ProjectionError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("malformed payload: {0}")]
    Json(String),
    #[error("job {id}: unknown status {status:?}")]
    UnknownStatus { id: JobId, status: String },
    #[error("expected a job list")]
    NotAList,
    #[error("response carried no job")]
    MissingJob,
    #[error("response carried no link profile")]
    MissingProfile,
    #[error("bad link: {0}")]
    Link(#[from] ProjectionError),
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        WireError::Json(err.to_string())
    }
}

#[derive(Deserialize)]
struct JobRecord {
    data: JobData,
    status: String,
}

#[derive(Deserialize)]
struct JobData {
    #[serde(rename = "Id")]
    id: RawId,
    #[serde(rename = "Enqueued")]
    enqueued: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawId> for JobId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(number) => JobId::new(number.to_string()),
            RawId::Text(text) => JobId::new(text),
        }
    }
}

#[derive(Deserialize)]
struct ResultsPayload {
    links: Vec<Map<String, Value>>,
}

/// Decodes one `{ data, status }` record.
///
/// Returns `Ok(None)` when the server sent no job at all: a null body, a
/// non-object, or an object without a `data` object.
pub fn decode_job(value: Value) -> Result<Option<Job>, WireError> {
    let has_data = value
        .get("data")
        .map(Value::is_object)
        .unwrap_or(false);
    if !has_data {
        return Ok(None);
    }

    let raw_data = value.get("data").cloned().unwrap_or(Value::Null);
    let record: JobRecord = serde_json::from_value(value)?;
    let id = JobId::from(record.data.id);
    let status: JobStatus = record
        .status
        .parse()
        .map_err(|_| WireError::UnknownStatus {
            id: id.clone(),
            status: record.status.clone(),
        })?;

    Ok(Some(
        Job::new(id, status, record.data.enqueued).with_data(raw_data),
    ))
}

/// Decodes the `jobs` route. Entries without a job are skipped.
pub fn decode_job_list(value: Value) -> Result<Vec<Job>, WireError> {
    let Value::Array(entries) = value else {
        return Err(WireError::NotAList);
    };

    let mut jobs = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(job) = decode_job(entry)? {
            jobs.push(job);
        }
    }
    Ok(jobs)
}

/// Decodes the `results` route into link records.
pub fn decode_results(value: Value) -> Result<Vec<LinkRecord>, WireError> {
    let payload: ResultsPayload = serde_json::from_value(value)?;
    payload
        .links
        .into_iter()
        .enumerate()
        .map(|(index, link)| LinkRecord::from_properties(index, link).map_err(WireError::from))
        .collect()
}
