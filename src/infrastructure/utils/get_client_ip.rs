use actix_web::HttpRequest;

/// Extract the client's IP address for the CAPTCHA `remoteip` hint.
/// `CF-Connecting-IP` wins when present; `X-Forwarded-For` is only read when
/// `trust_x_forwarded_for` is set. Empty when nothing is known.
pub fn get_client_ip(req: &HttpRequest, trust_x_forwarded_for: bool) -> String {
    if let Some(ip) = header_str(req, "cf-connecting-ip") {
        return ip.trim().to_string();
    }
    if trust_x_forwarded_for {
        if let Some(forwarded) = header_str(req, "x-forwarded-for") {
            return forwarded.split(',').next().unwrap_or("").trim().to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
}
