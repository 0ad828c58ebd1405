use std::cell::RefCell;
use std::fmt;
use std::fs;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Certificate, Url};
use serde::de::DeserializeOwned;

use crate::api::engine_dto::{
    AffinityGroupDto, AffinityGroupsDto, ClusterDto, HostDto, HostsDto, InstanceTypeDto, NetworkDto, NetworksDto, SsoTokenDto,
    VnicProfileDto, VnicProfilesDto,
};
use crate::domain::engine::engine_api::EngineApi;
use crate::domain::engine::engine_config::EngineConfig;
use crate::domain::engine::engine_endpoint::EngineEndpoint;
use crate::domain::utils::id::{ClusterId, InstanceTypeId};
use crate::error::{Error, Result};

const SSO_TOKEN_PATH: &str = "/sso/oauth/token";
const SSO_LOGOUT_PATH: &str = "/services/sso-logout";
const SSO_SCOPE: &str = "ovirt-app-api";

/// Blocking connection to the Engine v4 REST API.
///
/// The SSO token is requested on first use and revoked when the connection is dropped.
pub struct EngineConnection {
    api_url: String,
    sso_token_url: String,
    sso_logout_url: String,
    username: String,
    password: String,
    client: Client,
    token: RefCell<Option<String>>,
}

impl fmt::Debug for EngineConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConnection")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("authenticated", &self.token.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl EngineConnection {
    pub fn build(config: &EngineConfig) -> Result<Self> {
        config.check().map_err(|e| Error::Connection(e.to_string()))?;

        let url = Url::parse(&config.ovirt_url).map_err(|e| Error::Connection(format!("invalid url {}: {}", config.ovirt_url, e)))?;
        let api_url = url.as_str().trim_end_matches('/').to_string();
        let engine_root = api_url.strip_suffix("/api").unwrap_or(&api_url).to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("Version", HeaderValue::from_static("4"));

        let mut builder = Client::builder().default_headers(headers).danger_accept_invalid_certs(config.ovirt_insecure);

        if !config.ovirt_cafile.is_empty() {
            let pem = fs::read(&config.ovirt_cafile)
                .map_err(|e| Error::Connection(format!("failed to read CA file {}: {}", config.ovirt_cafile, e)))?;
            let cert = Certificate::from_pem(&pem).map_err(|e| Error::Connection(format!("invalid CA file {}: {}", config.ovirt_cafile, e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if !config.ovirt_ca_bundle.is_empty() {
            let cert = Certificate::from_pem(config.ovirt_ca_bundle.as_bytes())
                .map_err(|e| Error::Connection(format!("invalid CA bundle: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| Error::Connection(e.to_string()))?;

        log::debug!("Constructed Engine connection to {} as {}", api_url, config.ovirt_username);

        Ok(EngineConnection {
            sso_token_url: format!("{}{}", engine_root, SSO_TOKEN_PATH),
            sso_logout_url: format!("{}{}", engine_root, SSO_LOGOUT_PATH),
            api_url,
            username: config.ovirt_username.clone(),
            password: config.ovirt_password.clone(),
            client,
            token: RefCell::new(None),
        })
    }

    fn token(&self) -> Result<String> {
        if let Some(token) = self.token.borrow().as_ref() {
            return Ok(token.clone());
        }

        let params = [
            ("grant_type", "password"),
            ("scope", SSO_SCOPE),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let response = self.client.post(&self.sso_token_url).form(&params).send()?;
        let status = response.status();
        let body = response.text()?;
        let sso = serde_json::from_str::<SsoTokenDto>(&body).ok();

        if !status.is_success() {
            let reason = sso.and_then(|sso| sso.error_description.or(sso.error)).unwrap_or(body);
            return Err(Error::Engine(format!("authentication as {} failed with status {}: {}", self.username, status, reason)));
        }

        match sso.and_then(|sso| sso.access_token) {
            Some(token) => {
                *self.token.borrow_mut() = Some(token.clone());
                Ok(token)
            }
            None => Err(Error::Engine(format!("authentication as {} returned no access token", self.username))),
        }
    }

    fn get<T: DeserializeOwned>(&self, endpoint: EngineEndpoint, query: &[(&str, &str)]) -> Result<T> {
        let token = self.token()?;
        let url = format!("{}{}", self.api_url, endpoint.path());

        let response = self.client.get(&url).bearer_auth(token).query(query).send()?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json()?)
        } else {
            let body_text = response.text().unwrap_or_default();
            log::error!(
                "Engine request failed.\nUser: <<{}>>\nRequested-Endpoint: <<{:?}>>\nResponse-Status-Code: <<{}>>\nResponse-Body: <<{}>>",
                self.username,
                endpoint,
                status,
                body_text
            );
            Err(Error::Engine(format!("GET {} returned {}", url, status)))
        }
    }
}

impl EngineApi for EngineConnection {
    fn test(&self) -> Result<()> {
        self.get::<serde_json::Value>(EngineEndpoint::Root, &[]).map(|_| ())
    }

    fn cluster_name(&self, cluster_id: &ClusterId) -> Result<String> {
        let cluster: ClusterDto = self.get(EngineEndpoint::Cluster(cluster_id), &[])?;
        Ok(cluster.name)
    }

    fn cluster_networks(&self, cluster_id: &ClusterId) -> Result<Vec<NetworkDto>> {
        let networks: NetworksDto = self.get(EngineEndpoint::ClusterNetworks(cluster_id), &[])?;
        Ok(networks.network)
    }

    fn vnic_profiles(&self) -> Result<Vec<VnicProfileDto>> {
        let profiles: VnicProfilesDto = self.get(EngineEndpoint::VnicProfiles, &[])?;
        Ok(profiles.vnic_profile)
    }

    fn affinity_groups(&self, cluster_id: &ClusterId) -> Result<Vec<AffinityGroupDto>> {
        let groups: AffinityGroupsDto = self.get(EngineEndpoint::ClusterAffinityGroups(cluster_id), &[])?;
        Ok(groups.affinity_group)
    }

    fn hosts_in_cluster(&self, cluster_name: &str) -> Result<Vec<HostDto>> {
        let search = format!("cluster={}", cluster_name);
        let hosts: HostsDto = self.get(EngineEndpoint::Hosts, &[("search", search.as_str())])?;
        Ok(hosts.host)
    }

    fn instance_type(&self, instance_type_id: &InstanceTypeId) -> Result<InstanceTypeDto> {
        self.get(EngineEndpoint::InstanceType(instance_type_id), &[])
    }
}

impl Drop for EngineConnection {
    fn drop(&mut self) {
        let Some(token) = self.token.get_mut().take() else {
            return;
        };
        match self.client.get(&self.sso_logout_url).query(&[("scope", ""), ("token", token.as_str())]).send() {
            Ok(response) => log::debug!("Closed Engine connection to {} ({})", self.api_url, response.status()),
            Err(e) => log::debug!("Failed to revoke Engine token for {}: {}", self.api_url, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> EngineConfig {
        EngineConfig {
            ovirt_url: server.url("/ovirt-engine/api"),
            ovirt_username: "admin@internal".to_string(),
            ovirt_password: "secret".to_string(),
            ..Default::default()
        }
    }

    fn mock_sso(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/ovirt-engine/sso/oauth/token").body_contains("grant_type=password");
            then.status(200).json_body(json!({ "access_token": "tok-1", "token_type": "bearer" }));
        })
    }

    #[test]
    fn test_build_rejects_invalid_url() {
        let config = EngineConfig { ovirt_url: "not a url".to_string(), ovirt_username: "admin".to_string(), ..Default::default() };
        assert!(matches!(EngineConnection::build(&config), Err(Error::Connection(_))));
    }

    #[test]
    fn test_cluster_name_and_hosts() {
        let server = MockServer::start();
        let sso = mock_sso(&server);
        let cluster = server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/api/clusters/c1").header("authorization", "Bearer tok-1").header("version", "4");
            then.status(200).json_body(json!({ "id": "c1", "name": "Default", "cpu": { "type": "x86" } }));
        });
        let hosts = server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/api/hosts").query_param("search", "cluster=Default");
            then.status(200).json_body(json!({ "host": [ { "id": "h1", "name": "host1" }, { "id": "h2", "name": "host2" } ] }));
        });
        let logout = server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/services/sso-logout").query_param("token", "tok-1");
            then.status(200);
        });

        {
            let connection = EngineConnection::build(&config_for(&server)).unwrap();
            let name = connection.cluster_name(&ClusterId::new("c1")).unwrap();
            assert_eq!(name, "Default");
            assert_eq!(connection.hosts_in_cluster(&name).unwrap().len(), 2);
        }

        sso.assert_hits(1);
        cluster.assert();
        hosts.assert();
        logout.assert();
    }

    #[test]
    fn test_vnic_profiles_by_cluster_network() {
        let server = MockServer::start();
        mock_sso(&server);
        server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/api/clusters/c1/networks");
            then.status(200).json_body(json!({ "network": [ { "id": "n1", "name": "ovirtmgmt" }, { "id": "n2", "name": "storage" } ] }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/api/vnicprofiles");
            then.status(200).json_body(json!({ "vnic_profile": [
                { "id": "p1", "name": "ovirtmgmt", "network": { "id": "n1" } },
                { "id": "p2", "name": "storage", "network": { "id": "n2" } }
            ] }));
        });

        let connection = EngineConnection::build(&config_for(&server)).unwrap();
        let profiles = connection.vnic_profiles_by_cluster_network(&ClusterId::new("c1"), "ovirtmgmt").unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id.as_str(), "p1");

        assert!(connection.vnic_profiles_by_cluster_network(&ClusterId::new("c1"), "missing").is_err());
    }

    #[test]
    fn test_missing_instance_type_is_an_error() {
        let server = MockServer::start();
        mock_sso(&server);
        server.mock(|when, then| {
            when.method(GET).path("/ovirt-engine/api/instancetypes/nope");
            then.status(404).json_body(json!({ "reason": "Operation Failed", "detail": "Entity not found: nope" }));
        });

        let connection = EngineConnection::build(&config_for(&server)).unwrap();
        assert!(matches!(connection.instance_type(&InstanceTypeId::new("nope")), Err(Error::Engine(_))));
    }

    #[test]
    fn test_failed_authentication_with_html_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/ovirt-engine/sso/oauth/token");
            then.status(401).header("content-type", "text/html").body("<html><body>Unauthorized</body></html>");
        });

        let connection = EngineConnection::build(&config_for(&server)).unwrap();
        match connection.test() {
            Err(Error::Engine(msg)) => {
                assert!(msg.contains("401"), "{}", msg);
                assert!(msg.contains("Unauthorized"), "{}", msg);
            }
            other => panic!("Expected authentication failure, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_authentication() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/ovirt-engine/sso/oauth/token");
            then.status(400).json_body(json!({ "error": "access_denied", "error_description": "Cannot authenticate user" }));
        });

        let connection = EngineConnection::build(&config_for(&server)).unwrap();
        match connection.test() {
            Err(Error::Engine(msg)) => assert!(msg.contains("Cannot authenticate user"), "{}", msg),
            other => panic!("Expected authentication failure, got {:?}", other),
        }
    }
}
