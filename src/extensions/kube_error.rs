pub trait KubeErrorExt {
    fn api_code(&self) -> Option<u16>;

    fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    fn is_not_found(&self) -> bool {
        self.api_code() == Some(404)
    }
}

impl KubeErrorExt for kube::Error {
    fn api_code(&self) -> Option<u16> {
        match self {
            kube::Error::Api(response) => Some(response.code),
            _ => None,
        }
    }
}

/// Builds an API error the way the apiserver reports it.
#[cfg(test)]
pub fn api_error(code: u16, reason: &str, message: impl Into<String>) -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: message.into(),
        reason: reason.to_string(),
        code,
    })
}
