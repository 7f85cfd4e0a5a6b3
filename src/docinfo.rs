//! Doc-info XML embedded zlib-compressed in the file header.

/// Book metadata serialized into the header's `<Info>` document.
#[derive(Debug, Clone, Default)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
    pub book_id: Option<String>,
    pub publisher: Option<String>,
    pub label: Option<String>,
    pub category: Option<String>,
    pub classification: Option<String>,
    pub free_text: Option<String>,
    pub language: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<String>,
    pub producer: Option<String>,
}

impl BookInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_book_id(mut self, id: impl Into<String>) -> Self {
        self.book_id = Some(id.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

/// Uncompressed doc-info bytes: UTF-8 BOM followed by the XML document.
pub(crate) fn docinfo_bytes(info: &BookInfo, page_count: usize) -> Vec<u8> {
    let mut out = vec![0xEF, 0xBB, 0xBF];
    out.extend_from_slice(generate_info_xml(info, page_count).as_bytes());
    out
}

fn generate_info_xml(info: &BookInfo, page_count: usize) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<Info version=\"1.1\">\n");
    xml.push_str(" <BookInfo>\n");
    xml.push_str(&format!(
        "  <Title reading=\"\">{}</Title>\n",
        escape_xml(&info.title)
    ));
    xml.push_str(&format!(
        "  <Author reading=\"\">{}</Author>\n",
        escape_xml(&info.author)
    ));
    if let Some(id) = &info.book_id {
        xml.push_str(&format!("  <BookID>{}</BookID>\n", escape_xml(id)));
    }
    if let Some(publisher) = &info.publisher {
        xml.push_str(&format!(
            "  <Publisher reading=\"\">{}</Publisher>\n",
            escape_xml(publisher)
        ));
    }
    if let Some(label) = &info.label {
        xml.push_str(&format!(
            "  <Label reading=\"\">{}</Label>\n",
            escape_xml(label)
        ));
    }
    if let Some(category) = &info.category {
        xml.push_str(&format!(
            "  <Category>{}</Category>\n",
            escape_xml(category)
        ));
    }
    if let Some(classification) = &info.classification {
        xml.push_str(&format!(
            "  <Classification>{}</Classification>\n",
            escape_xml(classification)
        ));
    }
    if let Some(free_text) = &info.free_text {
        xml.push_str(&format!(
            "  <FreeText>{}</FreeText>\n",
            escape_xml(free_text)
        ));
    }
    xml.push_str(" </BookInfo>\n");

    xml.push_str(" <DocInfo>\n");
    if let Some(language) = &info.language {
        xml.push_str(&format!(
            "  <Language>{}</Language>\n",
            escape_xml(language)
        ));
    }
    if let Some(creator) = &info.creator {
        xml.push_str(&format!("  <Creator>{}</Creator>\n", escape_xml(creator)));
    }
    if let Some(date) = &info.creation_date {
        xml.push_str(&format!(
            "  <CreationDate>{}</CreationDate>\n",
            escape_xml(date)
        ));
    }
    if let Some(producer) = &info.producer {
        xml.push_str(&format!(
            "  <Producer>{}</Producer>\n",
            escape_xml(producer)
        ));
    }
    xml.push_str(&format!("  <SumPage>{page_count}</SumPage>\n"));
    xml.push_str(" </DocInfo>\n");
    xml.push_str("</Info>\n");

    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
