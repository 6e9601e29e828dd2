//! Payloads returned by the remote movie-metadata API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

/// Paging wrapper around a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListPage {
    pub page: u32,
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub cast_id: i64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub credit_id: String,
    #[serde(default)]
    pub department: String,
    pub job: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub id: i64,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    pub fn directors(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew.iter().filter(|member| member.job == "Director")
    }

    pub fn leading_cast(&self, limit: usize) -> &[CastMember] {
        &self.cast[..self.cast.len().min(limit)]
    }
}
