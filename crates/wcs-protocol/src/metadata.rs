//! Service-level metadata parsed eagerly from a WCS 1.0.0 capabilities document.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use wcs_common::{WcsError, WcsResult};

use crate::namespaces::{wcs, XLINK_NS};
use crate::xml::XmlElement;
use crate::WCS_VERSION;

/// HTTP method binding (DCPType) of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    /// Element name used for the binding inside `DCPType/HTTP`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Post => "Post",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            n if n.eq_ignore_ascii_case("get") => Some(HttpMethod::Get),
            n if n.eq_ignore_ascii_case("post") => Some(HttpMethod::Post),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of the capabilities `<Service>` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentification {
    pub version: String,
    pub service: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub fees: String,
    pub access_constraints: String,
}

impl ServiceIdentification {
    /// Parse from the `<Service>` element.
    ///
    /// `name`, `fees` and `accessConstraints` are mandatory; `description`
    /// is optional. WCS 1.0.0 has no separate title, so `title` repeats `name`.
    pub fn from_element(elem: &XmlElement) -> WcsResult<Self> {
        let name = required_text(elem, "name")?;
        Ok(Self {
            version: WCS_VERSION.to_string(),
            service: name.clone(),
            title: name,
            abstract_text: optional_text(elem, "description"),
            keywords: texts(elem, &wcs("keywords/keyword")),
            fees: required_text(elem, "fees")?,
            access_constraints: required_text(elem, "accessConstraints")?,
        })
    }
}

/// The service's `responsibleParty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub name: Option<String>,
    /// WCS 1.0.0 has no provider URL element; this repeats the organisation name.
    pub url: Option<String>,
    pub contact: ContactMetadata,
}

impl ServiceProvider {
    pub fn from_element(elem: &XmlElement) -> Self {
        let name = optional_text(elem, "organisationName");
        Self {
            url: name.clone(),
            name,
            contact: ContactMetadata::from_element(elem),
        }
    }
}

/// Contact details of the responsible party. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMetadata {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
}

impl ContactMetadata {
    pub fn from_element(elem: &XmlElement) -> Self {
        let address = |field: &str| optional_text(elem, &format!("contactInfo/address/{}", field));
        Self {
            name: optional_text(elem, "individualName"),
            organization: optional_text(elem, "organisationName"),
            address: address("deliveryPoint"),
            city: address("city"),
            region: address("administrativeArea"),
            postcode: address("postalCode"),
            country: address("country"),
            email: address("electronicMailAddress"),
        }
    }
}

/// One request type listed under `Capability/Request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Local name of the operation element, e.g. `GetCoverage`.
    pub name: String,
    /// Endpoint URL per HTTP method. A later binding for the same method
    /// replaces an earlier one.
    pub methods: HashMap<HttpMethod, String>,
}

impl OperationMetadata {
    pub fn from_element(elem: &XmlElement) -> Self {
        let href = format!("{{{}}}href", XLINK_NS);
        let mut methods = HashMap::new();
        for method in [HttpMethod::Get, HttpMethod::Post] {
            let path = wcs(&format!("DCPType/HTTP/{}/OnlineResource", method.as_str()));
            for resource in elem.findall(&path) {
                if let Some(url) = resource.attribute(&href) {
                    methods.insert(method, url.to_string());
                }
            }
        }
        Self {
            name: elem.local_name().to_string(),
            methods,
        }
    }

    /// Endpoint URL for `method`, if the operation declares it.
    pub fn url(&self, method: HttpMethod) -> Option<&str> {
        self.methods.get(&method).map(String::as_str)
    }

    /// Endpoint URL for `method`, or [`WcsError::MethodNotDeclared`].
    pub fn require_url(&self, method: HttpMethod) -> WcsResult<&str> {
        self.url(method).ok_or_else(|| WcsError::MethodNotDeclared {
            operation: self.name.clone(),
            method: method.to_string(),
        })
    }
}

fn optional_text(elem: &XmlElement, path: &str) -> Option<String> {
    elem.find_text(&wcs(path)).map(str::to_string)
}

fn required_text(elem: &XmlElement, path: &str) -> WcsResult<String> {
    let qualified = wcs(path);
    match elem.find(&qualified) {
        Some(found) => Ok(found.text().unwrap_or_default().to_string()),
        None => Err(WcsError::MissingElement(format!(
            "{}/{}",
            elem.local_name(),
            path
        ))),
    }
}

pub(crate) fn texts(elem: &XmlElement, path: &str) -> Vec<String> {
    elem.findall(path)
        .into_iter()
        .filter_map(XmlElement::text)
        .map(str::to_string)
        .collect()
}
