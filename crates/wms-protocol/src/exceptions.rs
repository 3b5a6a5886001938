//! WMS error documents.

use quick_xml::escape::escape;

/// Media type of capabilities and exception documents.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Generate a WMS ServiceExceptionReport.
pub fn wms_exception(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><ServiceExceptionReport><ServiceException code="{}">{}</ServiceException></ServiceExceptionReport>"#,
        escape(code),
        escape(message)
    )
}

/// Returned in place of capabilities when no layer has data.
pub fn no_data_document() -> &'static str {
    r#"<?xml version="1.0"?><error>No data available</error>"#
}

/// Bare `<error>` document for failures while building capabilities.
pub fn error_document(message: &str) -> String {
    format!(r#"<?xml version="1.0"?><error>{}</error>"#, escape(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_escapes_message() {
        let xml = wms_exception("LayerNotDefined", "Layer not found: <x>");
        assert!(xml.contains(r#"code="LayerNotDefined""#));
        assert!(xml.contains("Layer not found: &lt;x&gt;"));
    }

    #[test]
    fn test_error_document() {
        assert_eq!(
            error_document("a & b"),
            r#"<?xml version="1.0"?><error>a &amp; b</error>"#
        );
    }
}
