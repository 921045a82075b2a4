//! Admin API resource documents and their rendered forms.

use std::io::Write;

use proxyctl_core::{CtlError, Output};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::output::{TableDisplay, write_columns, write_fields};

/// A `{"data": ...}` document.
#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerResource {
    pub id: String,
    #[serde(default)]
    pub attributes: ServerAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerAttributes {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub parameters: ServerParameters,
    #[serde(default)]
    pub statistics: ServerStatistics,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerParameters {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub socket: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerStatistics {
    #[serde(default)]
    pub connections: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Relationships {
    #[serde(default)]
    pub services: Option<Document<Vec<ResourceRef>>>,
    #[serde(default)]
    pub monitors: Option<Document<Vec<ResourceRef>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
}

/// Decode a JSON response body into a typed document.
pub(crate) fn parse<T: DeserializeOwned>(output: Output) -> Result<T, CtlError> {
    match output {
        Output::Json(value) => serde_json::from_value(value)
            .map_err(|e| CtlError::Format(format!("unexpected response document: {e}"))),
        Output::Empty => Err(CtlError::Format("empty response, expected a JSON document".into())),
        Output::Text(_) => Err(CtlError::Format("response is not a JSON document".into())),
    }
}

fn ids(refs: Option<Document<Vec<ResourceRef>>>) -> Vec<String> {
    refs.map(|doc| doc.data.into_iter().map(|r| r.id).collect())
        .unwrap_or_default()
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// One row of `list servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ServerRow {
    pub server: String,
    pub address: String,
    pub port: Option<u16>,
    pub connections: u64,
    pub state: String,
}

impl From<ServerResource> for ServerRow {
    fn from(resource: ServerResource) -> Self {
        let params = resource.attributes.parameters;
        Self {
            server: resource.id,
            address: params.address.or(params.socket).unwrap_or_default(),
            port: params.port,
            connections: resource.attributes.statistics.connections,
            state: resource.attributes.state,
        }
    }
}

/// Result of `list servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct ServerList {
    pub servers: Vec<ServerRow>,
}

impl TableDisplay for ServerList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CtlError> {
        if self.servers.is_empty() {
            writeln!(writer, "No servers")?;
            return Ok(());
        }
        let rows: Vec<Vec<String>> = self
            .servers
            .iter()
            .map(|s| {
                vec![
                    s.server.clone(),
                    s.address.clone(),
                    s.port.map(|p| p.to_string()).unwrap_or_default(),
                    s.connections.to_string(),
                    s.state.clone(),
                ]
            })
            .collect();
        write_columns(writer, &["Server", "Address", "Port", "Connections", "State"], &rows)
    }
}

/// Result of `show server`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ServerDetail {
    pub server: String,
    pub address: String,
    pub port: Option<u16>,
    pub state: String,
    pub connections: u64,
    pub services: Vec<String>,
    pub monitors: Vec<String>,
}

impl From<ServerResource> for ServerDetail {
    fn from(resource: ServerResource) -> Self {
        let services = ids(resource.relationships.services);
        let monitors = ids(resource.relationships.monitors);
        let row = ServerRow::from(ServerResource {
            id: resource.id,
            attributes: resource.attributes,
            relationships: Relationships::default(),
        });
        Self {
            server: row.server,
            address: row.address,
            port: row.port,
            state: row.state,
            connections: row.connections,
            services,
            monitors,
        }
    }
}

impl TableDisplay for ServerDetail {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CtlError> {
        write_fields(
            writer,
            &[
                ("Server", self.server.clone()),
                ("Address", self.address.clone()),
                ("Port", self.port.map(|p| p.to_string()).unwrap_or_else(|| "-".into())),
                ("State", self.state.clone()),
                ("Connections", self.connections.to_string()),
                ("Services", join_or_dash(&self.services)),
                ("Monitors", join_or_dash(&self.monitors)),
            ],
        )
    }
}
