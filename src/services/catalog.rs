/// Static movie catalog
///
/// Supplies the genre tiles and, per genre, the candidate movies the slot machine
/// samples from. The built-in catalog covers Bollywood and the southern industries;
/// a JSON file with the same shape can replace it at startup.
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Genre, Movie},
};

/// Read-only source of genres and their candidate movies
pub trait CatalogProvider: Send + Sync {
    /// Genres in display order
    fn list_genres(&self) -> Vec<Genre>;

    /// Candidates for a genre key; unknown keys yield an empty list
    fn candidates_for(&self, genre: &str) -> Vec<Movie>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    genres: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    genre: Genre,
    #[serde(default)]
    movies: Vec<Movie>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    genres: Vec<Genre>,
    movies: HashMap<String, Vec<Movie>>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<(Genre, Vec<Movie>)>) -> Self {
        let mut genres = Vec::with_capacity(entries.len());
        let mut movies = HashMap::with_capacity(entries.len());

        for (genre, list) in entries {
            movies.insert(genre.name.clone(), list);
            genres.push(genre);
        }

        Self { genres, movies }
    }

    /// Parses a catalog from JSON: `{"genres": [{"name": ..., "movies": [...]}, ...]}`
    pub fn from_json(json: &str) -> AppResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| AppError::InvalidInput(format!("Invalid catalog JSON: {}", e)))?;

        let mut seen = std::collections::HashSet::new();
        for entry in &file.genres {
            if !seen.insert(entry.genre.name.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "Duplicate genre in catalog: {}",
                    entry.genre.name
                )));
            }
        }

        Ok(Self::new(
            file.genres
                .into_iter()
                .map(|entry| (entry.genre, entry.movies))
                .collect(),
        ))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            genres = catalog.genres.len(),
            "Loaded catalog from file"
        );
        Ok(catalog)
    }

    /// The catalog shipped with the app
    pub fn builtin() -> Self {
        Self::new(vec![
            (
                genre(
                    "Feel Good",
                    "Sun",
                    "text-amber-300",
                    "from-amber-500/20 to-orange-600/20",
                    "Warm hugs in movie form",
                ),
                vec![
                    Movie::new("3 Idiots", "2009", "Three engineering students learn that chasing excellence beats chasing marks.", "🎓"),
                    Movie::new("Zindagi Na Milegi Dobara", "2011", "Three friends on a Spanish road trip confront their fears.", "🏖️"),
                    Movie::new("Queen", "2013", "Jilted before her wedding, Rani takes the honeymoon alone.", "👑"),
                    Movie::new("Chak De! India", "2007", "A disgraced coach forges a winning women's hockey team.", "🏑"),
                    Movie::new("Piku", "2015", "A daughter, her cranky father and a long drive to Kolkata.", "🚗"),
                    Movie::new("Munna Bhai M.B.B.S.", "2003", "A lovable goon enrolls in medical school with a hug for every patient.", "🩺"),
                ],
            ),
            (
                genre(
                    "Thriller",
                    "Eye",
                    "text-rose-300",
                    "from-rose-500/20 to-red-700/20",
                    "Edge-of-the-seat suspense",
                ),
                vec![
                    Movie::new("Drishyam", "2013", "A cable operator shields his family with an airtight alibi.", "🕵️"),
                    Movie::new("Andhadhun", "2018", "A 'blind' pianist witnesses a murder he was never meant to see.", "🎹"),
                    Movie::new("Kahaani", "2012", "A pregnant woman searches Kolkata for her missing husband.", "🧳"),
                    Movie::new("Ratsasan", "2018", "An aspiring filmmaker turned cop hunts a serial killer.", "🔪"),
                    Movie::new("Vikram Vedha", "2017", "A cop and a gangster trade stories that blur right and wrong.", "⚖️"),
                ],
            ),
            (
                genre(
                    "Romance",
                    "Heart",
                    "text-pink-300",
                    "from-pink-500/20 to-fuchsia-600/20",
                    "Love stories that linger",
                ),
                vec![
                    Movie::new("Dilwale Dulhania Le Jayenge", "1995", "Raj follows Simran from Europe to Punjab to win her family over.", "🚂"),
                    Movie::new("Premam", "2015", "Three loves across three chapters of one man's life.", "🦋"),
                    Movie::new("Jab We Met", "2007", "A chatterbox on a train rewires a heartbroken businessman.", "🚆"),
                    Movie::new("Sita Ramam", "2022", "Letters to a lonely soldier turn into a love across borders.", "✉️"),
                    Movie::new("Barfi!", "2012", "A deaf-mute charmer and two women who love him differently.", "🎈"),
                ],
            ),
            (
                genre(
                    "Action",
                    "Flame",
                    "text-orange-300",
                    "from-orange-500/20 to-yellow-600/20",
                    "Mass entertainers, full volume",
                ),
                vec![
                    Movie::new("Baahubali: The Beginning", "2015", "A young man climbs a waterfall into a kingdom's bloody past.", "🗡️"),
                    Movie::new("K.G.F: Chapter 1", "2018", "Rocky fights his way into the heart of the Kolar gold fields.", "⛏️"),
                    Movie::new("RRR", "2022", "Two revolutionaries, one friendship, and a lot of fire and water.", "🔥"),
                    Movie::new("Sholay", "1975", "Two small-time crooks are hired to capture a ruthless dacoit.", "🤠"),
                    Movie::new("Vikram", "2022", "A black-ops squad uncovers a drug cartel and a legend in hiding.", "💥"),
                ],
            ),
            (
                genre(
                    "Comedy",
                    "Laugh",
                    "text-lime-300",
                    "from-lime-500/20 to-emerald-600/20",
                    "Laugh till it hurts",
                ),
                vec![
                    Movie::new("Hera Pheri", "2000", "Three broke men intercept a kidnapper's ransom call.", "📞"),
                    Movie::new("Andaz Apna Apna", "1994", "Two slackers compete for an heiress and stumble into a crime caper.", "🤡"),
                    Movie::new("Jaane Bhi Do Yaaro", "1983", "Two photographers capture a murder and the city's corruption.", "📸"),
                    Movie::new("Chupke Chupke", "1975", "A botany professor poses as a chauffeur to prank his in-laws.", "📚"),
                    Movie::new("Delhi Belly", "2011", "A stool sample and a stash of diamonds get swapped.", "🌶️"),
                ],
            ),
            (
                genre(
                    "Mind-Bending",
                    "BrainCircuit",
                    "text-indigo-300",
                    "from-indigo-500/20 to-violet-700/20",
                    "Stories that twist your brain",
                ),
                vec![
                    Movie::new("Tumbbad", "2018", "A family's greed for a cursed treasure spans three generations.", "🪙"),
                    Movie::new("Super Deluxe", "2019", "Four stories collide over one strange day in Chennai.", "🌀"),
                    Movie::new("Aaranya Kaandam", "2010", "A gangster, his mistress and a stolen stash of cocaine.", "🐓"),
                    Movie::new("Ship of Theseus", "2012", "Three strangers linked by organ donation question identity.", "🚢"),
                    Movie::new("Game Over", "2019", "A game designer relives a night of terror inside her own home.", "🎮"),
                ],
            ),
        ])
    }
}

fn genre(name: &str, icon: &str, color: &str, gradient: &str, desc: &str) -> Genre {
    Genre {
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        gradient: gradient.to_string(),
        desc: desc.to_string(),
    }
}

impl CatalogProvider for StaticCatalog {
    fn list_genres(&self) -> Vec<Genre> {
        self.genres.clone()
    }

    fn candidates_for(&self, genre: &str) -> Vec<Movie> {
        self.movies.get(genre).cloned().unwrap_or_default()
    }
}
