use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
    configuration::Settings,
    domain::{
        aggregate, resolve_canonical_name, CanonicalName, PhoneQuery, PlaceCandidate,
        RecordLayout, RegistryMatch, ResolvedRecord,
    },
};

use super::{Fetcher, PlaceSearchClient, RegistryClient};

/// Everything learned about one phone number.
#[derive(Debug, Clone)]
pub struct PhoneResolution {
    pub candidates: Vec<PlaceCandidate>,
    pub canonical_name: CanonicalName,
    pub registry_matches: Vec<RegistryMatch>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub run_id: Uuid,
    pub layout: RecordLayout,
    pub candidates: Vec<PlaceCandidate>,
    pub canonical_names: Vec<CanonicalName>,
    pub records: Vec<ResolvedRecord>,
}

/// Phone number -> place candidates -> canonical name -> registry record.
#[derive(Clone)]
pub struct Pipeline {
    places: PlaceSearchClient,
    registry: RegistryClient,
    workers: usize,
}

impl Pipeline {
    pub fn new(places: PlaceSearchClient, registry: RegistryClient, workers: usize) -> Self {
        Pipeline {
            places,
            registry,
            workers: workers.max(1),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = Fetcher::from_settings(&settings.fetch)?;
        let places = PlaceSearchClient::from_settings(
            fetcher.clone(),
            &settings.place_search,
            &settings.fetch,
        )?;
        let registry = RegistryClient::from_settings(fetcher, &settings.registry, &settings.fetch)?;

        Ok(Pipeline::new(places, registry, settings.pipeline.workers))
    }

    pub fn layout(&self) -> RecordLayout {
        RecordLayout::for_candidates(self.registry.max_candidates())
    }

    pub async fn resolve_phone(&self, phone: &PhoneQuery) -> PhoneResolution {
        let candidates = self.places.lookup_places(phone).await;
        let canonical_name = resolve_canonical_name(phone, &candidates);

        let registry_matches = match canonical_name.is_no_result() || canonical_name.name.is_empty()
        {
            true => {
                log::warn!("Skipping registry lookup for {}: no usable name", phone);
                vec![]
            }
            false => self.registry.resolve_registry(&canonical_name.name).await,
        };

        PhoneResolution {
            candidates,
            canonical_name,
            registry_matches,
        }
    }

    /// Resolves every phone number. Failures degrade to sentinel or empty
    /// rows, so every input phone appears in the output at least once and in
    /// input order.
    pub async fn run(&self, phones: &[PhoneQuery]) -> PipelineOutput {
        let run_id = Uuid::new_v4();
        log::info!(
            "Run {} started for {} phone numbers with {} worker(s)",
            run_id,
            phones.len(),
            self.workers
        );

        let resolutions = match self.workers {
            1 => self.run_sequential(phones).await,
            _ => self.run_pooled(phones).await,
        };

        let output = self.assemble(run_id, resolutions);
        log::info!(
            "Run {} finished with {} candidates, {} names, {} records",
            run_id,
            output.candidates.len(),
            output.canonical_names.len(),
            output.records.len()
        );
        output
    }

    async fn run_sequential(&self, phones: &[PhoneQuery]) -> Vec<PhoneResolution> {
        let mut resolutions = Vec::with_capacity(phones.len());
        for (i, phone) in phones.iter().enumerate() {
            log::info!("Resolving {} ({}/{})", phone, i + 1, phones.len());
            resolutions.push(self.resolve_phone(phone).await);
        }
        resolutions
    }

    async fn run_pooled(&self, phones: &[PhoneQuery]) -> Vec<PhoneResolution> {
        let permits = Arc::new(Semaphore::new(self.workers));

        let handles: Vec<_> = phones
            .iter()
            .cloned()
            .map(|phone| {
                let pipeline = self.clone();
                let permits = permits.clone();
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    pipeline.resolve_phone(&phone).await
                })
            })
            .collect();

        let mut resolutions = Vec::with_capacity(phones.len());
        for (phone, handle) in phones.iter().zip(handles) {
            match handle.await {
                Ok(resolution) => resolutions.push(resolution),
                Err(e) => {
                    log::error!("Worker for {} stopped: {:?}", phone, e);
                    resolutions.push(unresolved(phone));
                }
            }
        }
        resolutions
    }

    fn assemble(&self, run_id: Uuid, resolutions: Vec<PhoneResolution>) -> PipelineOutput {
        let layout = self.layout();
        let mut candidates = vec![];
        let mut canonical_names = vec![];
        let mut registry_matches = vec![];

        for resolution in resolutions {
            candidates.extend(resolution.candidates);
            canonical_names.push(resolution.canonical_name);
            registry_matches.push(resolution.registry_matches);
        }

        let records = aggregate(&canonical_names, &registry_matches, layout);

        PipelineOutput {
            run_id,
            layout,
            candidates,
            canonical_names,
            records,
        }
    }
}

fn unresolved(phone: &PhoneQuery) -> PhoneResolution {
    let candidates = vec![PlaceCandidate::no_result(phone)];
    let canonical_name = resolve_canonical_name(phone, &candidates);

    PhoneResolution {
        candidates,
        canonical_name,
        registry_matches: vec![],
    }
}
