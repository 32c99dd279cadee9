//! Blocking GraphDB SPARQL client.
//!
//! Thin transport over the repository query endpoint; result-set parsing
//! and reconstruction live in `surveygraph-ingest-graph`.

use surveygraph_ingest_graph::{
    complete_question_query, reconstruct_groups, reconstruct_question, sparql::SparqlResults,
    FactRow, GroupFactRow, GroupTree, GROUPS_QUERY,
};
use surveygraph_model::{Error, QuestionDocument};

use crate::config::GraphDbConfig;
use crate::orchestrator::QuestionSource;

pub struct GraphDbClient {
    config: GraphDbConfig,
    http: reqwest::blocking::Client,
}

impl GraphDbClient {
    pub fn new(config: GraphDbConfig) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Run one SELECT and parse the `application/sparql-results+json`
    /// answer.
    pub fn select(&self, query: &str) -> Result<SparqlResults, Error> {
        let endpoint = self.config.endpoint();
        tracing::debug!(endpoint = %endpoint, "sparql select");

        let mut request = self
            .http
            .get(&endpoint)
            .query(&[("query", query)])
            .header(reqwest::header::ACCEPT, "application/sparql-results+json");
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .map_err(|e| Error::Transport(format!("failed to reach graphdb at {endpoint}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Transport(format!(
                "sparql query failed with {status}: {body}"
            )));
        }

        response
            .json()
            .map_err(|e| Error::Transport(format!("invalid sparql result JSON: {e}")))
    }

    /// Fetch and reconstruct the complete document of one question node.
    /// `Ok(None)` means the graph holds no rows for the node.
    pub fn fetch_question(&self, question_uri: &str) -> Result<Option<QuestionDocument>, Error> {
        let results = self.select(&complete_question_query(question_uri))?;
        let rows: Vec<FactRow> = results
            .results
            .bindings
            .iter()
            .map(FactRow::from_binding)
            .collect();
        reconstruct_question(&rows)
    }

    /// Fetch the full group → question outline of the repository.
    pub fn fetch_groups(&self) -> Result<Vec<GroupTree>, Error> {
        let results = self.select(GROUPS_QUERY)?;
        let rows: Vec<GroupFactRow> = results
            .results
            .bindings
            .iter()
            .map(GroupFactRow::from_binding)
            .collect();
        Ok(reconstruct_groups(&rows))
    }
}

impl QuestionSource for GraphDbClient {
    fn fetch(&self, reference: &str) -> Result<Option<QuestionDocument>, Error> {
        self.fetch_question(reference)
    }
}
