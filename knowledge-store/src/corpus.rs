//! Built-in oceanographic knowledge used to seed an empty index.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    embed::EmbeddingsProvider,
    errors::RagError,
    index::{DocPayload, IndexedDoc, VectorIndex},
};

/// Parallel embedding calls while seeding.
const SEED_CONCURRENCY: usize = 4;

pub struct KnowledgeDoc {
    pub source_id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

pub const SEED_DOCS: &[KnowledgeDoc] = &[
    KnowledgeDoc {
        source_id: "argo_program",
        title: "The Argo program",
        text: "Argo is a global array of roughly 4000 autonomous profiling floats. Each float \
               drifts at about 1000 m, descends to 2000 m every ten days and then rises to the \
               surface while measuring temperature, salinity and pressure. Profiles are relayed \
               by satellite and published within a day through the Argo data centres.",
    },
    KnowledgeDoc {
        source_id: "bgc_argo",
        title: "Biogeochemical Argo",
        text: "BGC-Argo floats add sensors for dissolved oxygen, nitrate, pH, chlorophyll \
               fluorescence, suspended particles and downwelling light. Coverage is sparser \
               than core Argo, so biogeochemical questions often have few nearby profiles.",
    },
    KnowledgeDoc {
        source_id: "temperature_structure",
        title: "Vertical temperature structure",
        text: "Ocean temperature is warmest in the surface mixed layer, typically 20 to 30 °C in \
               the tropics, and drops sharply across the thermocline between roughly 100 and \
               1000 m. Below 1000 m water is cold and uniform, usually 2 to 4 °C. Surface \
               temperature decreases from the equator toward the poles.",
    },
    KnowledgeDoc {
        source_id: "salinity_basics",
        title: "Salinity",
        text: "Salinity is reported on the Practical Salinity Scale (PSU) and ranges from about \
               32 to 37 in the open ocean. Evaporation raises surface salinity while rainfall, \
               river discharge and ice melt lower it. Deep water salinity converges near 34.7.",
    },
    KnowledgeDoc {
        source_id: "bay_of_bengal",
        title: "Bay of Bengal",
        text: "The Bay of Bengal receives heavy monsoon rain and the outflow of the Ganges, \
               Brahmaputra and Irrawaddy rivers, giving it unusually fresh surface water, often \
               below 33 PSU. The fresh layer creates strong stratification and barrier layers \
               that keep the surface warm and suppress vertical mixing.",
    },
    KnowledgeDoc {
        source_id: "arabian_sea",
        title: "Arabian Sea",
        text: "The Arabian Sea is saltier than the Bay of Bengal, with surface salinity around \
               36 to 37 PSU, because evaporation exceeds precipitation and high-salinity water \
               flows in from the Red Sea and Persian Gulf. Monsoon winds drive strong coastal \
               upwelling off Oman and Somalia.",
    },
    KnowledgeDoc {
        source_id: "oxygen_minimum_zone",
        title: "Oxygen minimum zones",
        text: "Dissolved oxygen is highest near the surface and falls to a minimum at \
               intermediate depths where respiration consumes it faster than circulation \
               replaces it. The Arabian Sea hosts one of the most intense oxygen minimum zones \
               in the world, between about 150 and 1200 m.",
    },
    KnowledgeDoc {
        source_id: "qc_flags",
        title: "Argo quality control flags",
        text: "Argo measurements carry QC flags: 1 good, 2 probably good, 3 probably bad, \
               4 bad, 5 value changed, 8 estimated and 9 missing. Scientific analyses usually \
               keep flags 1 and 2, and treat 5 and 8 with care.",
    },
    KnowledgeDoc {
        source_id: "enso_iod",
        title: "El Niño and the Indian Ocean Dipole",
        text: "El Niño warms the central and eastern tropical Pacific and shifts rainfall \
               worldwide. In the Indian Ocean the Indian Ocean Dipole sets up an east-west \
               temperature contrast; positive phases warm the western basin and affect monsoon \
               rainfall over India and East Africa.",
    },
    KnowledgeDoc {
        source_id: "acidification",
        title: "Ocean acidification",
        text: "The ocean absorbs about a quarter of human carbon dioxide emissions, lowering \
               seawater pH. Surface pH has dropped from about 8.2 to 8.1 since preindustrial \
               times, which makes it harder for corals and shelled organisms to build calcium \
               carbonate.",
    },
];

/// Deterministic point id for a seed document.
pub fn doc_point_id(source_id: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("floatchat/knowledge/{source_id}").as_bytes(),
    )
}

/// Embeds and upserts [`SEED_DOCS`] when the index is empty.
///
/// Returns the number of documents written (0 when the index already had data).
#[instrument(skip_all)]
pub async fn seed_if_empty(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingsProvider,
) -> Result<usize, RagError> {
    let existing = index.count().await?;
    if existing > 0 {
        info!(existing, "knowledge index already populated");
        return Ok(0);
    }

    let docs: Vec<IndexedDoc> = stream::iter(SEED_DOCS)
        .map(|doc| async move {
            let body = format!("{}. {}", doc.title, doc.text);
            let vector = embedder.embed(&body).await?;
            Ok::<_, RagError>(IndexedDoc {
                id: doc_point_id(doc.source_id).to_string(),
                vector,
                payload: DocPayload {
                    source_id: doc.source_id.to_string(),
                    title: doc.title.to_string(),
                    text: doc.text.to_string(),
                },
            })
        })
        .buffer_unordered(SEED_CONCURRENCY)
        .try_collect()
        .await?;

    let written = index.upsert(docs).await?;
    info!(written, "seeded knowledge index");
    Ok(written)
}
