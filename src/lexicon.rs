//! Keyword lists and stopwords that drive the text analytics
//!
//! The built-in lexicon targets reviews of an audio-first, accessibility
//! oriented adventure game, written in Portuguese, English and Spanish. Any
//! section can be replaced by providing a JSON file such as
//!
//! ```json
//! {
//!   "concepts": { "combat": ["combat", "fight"] },
//!   "stopwords": ["the", "and"]
//! }
//! ```
//!
//! where omitted sections keep their built-in value.

use crate::Result;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::{collections::HashSet, path::Path};

/// Named categories, each detected by a list of literal terms
///
/// Order matters: it breaks ties between equally frequent categories.
pub type ConceptMap = IndexMap<Box<str>, Box<[Box<str>]>>;

/// Keyword lists and stopwords
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Lexicon {
    /// Concepts whose frequency is measured across the corpus
    pub concepts: ConceptMap,

    /// Aspects of the game whose reception is scored
    pub aspects: ConceptMap,

    /// Concepts that become nodes of the co-occurrence network
    pub network: ConceptMap,

    /// Words that are ignored when building n-grams
    pub stopwords: HashSet<Box<str>>,
}
//
impl Lexicon {
    /// Load a lexicon from a JSON file, or use the built-in one
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading lexicon {}", path.display()))?;
        let lexicon = serde_json::from_slice::<Self>(&json)
            .with_context(|| format!("decoding lexicon {}", path.display()))?;
        log::info!("Using lexicon from {}", path.display());
        Ok(lexicon.normalized())
    }

    /// Lowercase every term, since matching is done on lowercased text
    fn normalized(self) -> Self {
        let lowercase = |map: ConceptMap| -> ConceptMap {
            map.into_iter()
                .map(|(name, terms)| {
                    let terms = terms
                        .iter()
                        .map(|term| term.to_lowercase().into_boxed_str())
                        .filter(|term| {
                            if term.is_empty() {
                                log::warn!("Ignoring empty term of concept {name:?}");
                            }
                            !term.is_empty()
                        })
                        .collect();
                    (name, terms)
                })
                .collect()
        };
        Self {
            concepts: lowercase(self.concepts),
            aspects: lowercase(self.aspects),
            network: lowercase(self.network),
            stopwords: self
                .stopwords
                .into_iter()
                .map(|word| word.to_lowercase().into())
                .collect(),
        }
    }
}
//
impl Default for Lexicon {
    fn default() -> Self {
        Self {
            concepts: concept_map(&[
                ("acessibilidade", &["accessibility", "accessible", "acessibilidade", "accesibilidad", "blind", "cego", "visual"]),
                ("audio_espacial", &["spatial audio", "sound design", "áudio espacial", "audio", "som", "sonido"]),
                ("narrativa", &["story", "narrative", "história", "narrativa", "historia", "plot"]),
                ("imersao", &["immersive", "immersion", "imersivo", "envolvente", "inmersivo"]),
                ("combate", &["combat", "fight", "battle", "combate", "luta"]),
                ("exploracao", &["exploration", "explore", "exploração", "explorar"]),
                ("gameplay", &["gameplay", "mechanics", "jogabilidade", "mecânica"]),
                ("qualidade", &["quality", "qualidade", "calidad", "excellent", "excelente"]),
            ]),
            aspects: concept_map(&[
                ("Qualidade do Áudio", &["audio", "sound", "áudio", "som", "sonido"]),
                ("História", &["story", "narrative", "história", "narrativa", "historia"]),
                ("Jogabilidade", &["gameplay", "mechanics", "jogabilidade", "mecânica"]),
                ("Acessibilidade", &["accessibility", "accessible", "acessibilidade", "accesibilidad"]),
                ("Duração", &["length", "duration", "short", "long", "duração", "curto"]),
                ("Replay Value", &["replay", "replayability", "rejogabilidade"]),
            ]),
            network: concept_map(&[
                ("Acessibilidade", &["accessibility", "accessible", "acessibilidade", "blind", "cego", "visual"]),
                ("Audio_Espacial", &["spatial audio", "sound design", "áudio espacial", "audio", "som", "binaural", "hearing", "headphones"]),
                ("Narrativa", &["story", "narrative", "história", "plot", "writing", "voice acting"]),
                ("Imersao", &["immersive", "immersion", "imersivo", "atmosphere"]),
                ("Combate", &["combat", "fight", "battle", "combate", "luta"]),
                ("Exploracao", &["exploration", "explore", "exploração", "world"]),
                ("Jogabilidade", &["gameplay", "mechanics", "jogabilidade", "play"]),
                ("Acessivel", &["accessible", "barrier-free", "inclusive"]),
            ]),
            stopwords: PORTUGUESE_STOPWORDS
                .iter()
                .chain(ENGLISH_STOPWORDS)
                .map(|&word| word.into())
                .collect(),
        }
    }
}

/// Build a concept map from static data
fn concept_map(concepts: &[(&str, &[&str])]) -> ConceptMap {
    concepts
        .iter()
        .map(|&(name, terms)| (name.into(), terms.iter().map(|&term| term.into()).collect()))
        .collect()
}

/// Common Portuguese words that carry no topical meaning
const PORTUGUESE_STOPWORDS: &[&str] = &[
    "a", "o", "e", "de", "do", "da", "em", "um", "uma", "que", "é", "com", "não", "os", "as",
    "para", "se", "na", "no", "por", "mais", "foi", "ao", "dos", "das", "seu", "sua", "ou", "ser",
    "quando", "muito", "nos", "já", "está", "eu", "também", "só", "pelo", "pela", "até", "isso",
    "ela", "entre", "era", "depois", "sem", "mesmo", "aos", "ter", "seus", "quem", "nas", "me",
    "esse", "eles", "estão", "você", "tinha", "foram", "essa", "num", "nem", "suas", "meu", "às",
    "minha", "têm", "numa", "pelos", "elas", "havia", "seja", "qual", "será", "nós", "tenho",
    "lhe", "deles", "essas", "esses", "pelas", "este", "fosse", "dele", "tu", "te", "vocês", "vos",
    "lhes", "meus", "minhas", "teu", "tua", "teus", "tuas", "nosso", "nossa", "nossos", "nossas",
    "dela", "delas", "esta", "estes", "estas", "aquele", "aquela", "aqueles", "aquelas", "isto",
    "aquilo", "estou", "estamos", "estive", "esteve", "estivemos", "estiveram", "estava",
    "estávamos", "estavam", "estivera", "estivéramos", "esteja", "estejamos", "estejam",
    "estivesse", "estivéssemos", "estivessem", "estiver", "estivermos", "estiverem", "hei", "há",
    "havemos", "hão", "houve", "houvemos", "houveram", "houvera", "houvéramos", "haja",
    "hajamos", "hajam", "houvesse", "houvéssemos", "houvessem", "houver", "houvermos",
    "houverem", "houverei", "houverá", "houveremos", "houverão", "houveria", "houveríamos",
    "houveriam", "sou", "somos", "são", "éramos", "eram", "fui", "fomos", "fora", "foramos",
    "sejamos", "sejam", "fôssemos", "fossem", "for", "formos", "forem", "serei", "seremos",
    "serão", "seria", "seríamos", "seriam", "tem", "temos", "tém", "tínhamos", "tinham", "tive",
    "teve", "tivemos", "tiveram", "tivera", "tivéramos", "tenha", "tenhamos", "tenham",
    "tivesse", "tivéssemos", "tivessem", "tiver", "tivermos", "tiverem", "terei", "terá",
    "teremos", "terão", "teria", "teríamos", "teriam",
];

/// Common English words that carry no topical meaning, plus words that are
/// ubiquitous in game reviews
const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "and", "of", "to", "a", "in", "is", "it", "you", "that", "for", "on", "with", "as",
    "was", "are", "this", "but", "be", "have", "not", "an", "at", "or", "if", "from", "my", "all",
    "so", "me", "by", "one", "can", "just", "like", "about", "very", "out", "what", "game",
    "play", "really",
];
