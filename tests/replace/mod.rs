//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use webpify::core::{replace, Document, WebpOptions};

    use crate::common::Site;

    fn replace_str(html: &str, options: &WebpOptions) -> String {
        let document = Document::new("index.html", html);
        let output = replace(&document, options).unwrap();
        String::from_utf8(output.document).unwrap()
    }

    #[test]
    fn plain_img() {
        let result = replace_str(r#"<img src="/assets/images/test.png">"#, &WebpOptions::default());

        assert_eq!(
            result,
            r#"<img data-src="/assets/images/test.png" data-webp-src="/assets/images/test.webp" class="j-webp">"#
        );
    }

    #[test]
    fn entity_in_src_is_not_escaped_again() {
        let result = replace_str(
            r#"<img src="/img/a&amp;b.png?x=1&amp;y=2.png">"#,
            &WebpOptions::default(),
        );

        assert_eq!(
            result,
            r#"<img data-src="/img/a&amp;b.png?x=1&amp;y=2.png" data-webp-src="/img/a&amp;b.png?x=1&amp;y=2.webp" class="j-webp">"#
        );
        assert!(!result.contains("&amp;amp;"));
    }

    #[test]
    fn single_quoted_src_with_double_quote() {
        let result = replace_str(r#"<img src='say"hi".png'>"#, &WebpOptions::default());
        assert!(result.contains(r#"data-webp-src="say&quot;hi&quot;.webp""#));
    }

    #[test]
    fn existing_class_is_merged_once() {
        let options = WebpOptions::default();
        let once = replace_str(r#"<img class="foo" src="a.jpeg">"#, &options);
        let twice = replace_str(&once, &options);

        assert!(once.contains(r#"class="foo j-webp""#));
        assert_eq!(once, twice);
        assert_eq!(twice.matches("j-webp").count(), 1);
    }

    #[test]
    fn skip_marker_keeps_tag() {
        let html = r#"<div><img src="/assets/images/demo.png" _nowebp></div>"#;
        assert_eq!(replace_str(html, &WebpOptions::default()), html);
    }

    #[test]
    fn ineligible_extension_keeps_tag() {
        let html = r#"<img src="logo.svg"><img src="anim.gif">"#;
        assert_eq!(replace_str(html, &WebpOptions::default()), html);
    }

    #[test]
    fn custom_image_types() {
        let options = WebpOptions {
            image_types: webpify::ImageTypes::parse("gif"),
            ..WebpOptions::default()
        };
        let result = replace_str(r#"<img src="anim.gif"><img src="a.png">"#, &options);

        assert!(result.contains(r#"data-webp-src="anim.webp""#));
        assert!(result.contains(r#"<img src="a.png">"#));
    }

    #[test]
    fn video_poster() {
        let result = replace_str(
            r#"<video poster="X.jpg" controls></video>"#,
            &WebpOptions::default(),
        );

        assert!(result.contains(r#"data-poster="X.jpg""#));
        assert!(result.contains(r#"data-webp-poster="X.webp""#));
        assert!(!result.contains("data-webp-src"));
    }

    #[test]
    fn identical_tags_are_all_rewritten() {
        let html = "<ul><li><img src=\"a.png\"></li><li><img src=\"a.png\"></li></ul>";
        let result = replace_str(html, &WebpOptions::default());

        assert_eq!(result.matches(r#"data-webp-src="a.webp""#).count(), 2);
        assert!(!result.contains(r#" src="a.png""#));
    }

    #[test]
    fn reference_count_is_preserved() {
        let html = r#"<img src="a.png"><p>text</p><img src='b.jpg'><video poster="c.png"></video>"#;
        let result = replace_str(html, &WebpOptions::default());

        assert_eq!(result.matches("<img").count(), 2);
        assert_eq!(result.matches("<video").count(), 1);
        assert_eq!(result.matches("data-webp-").count(), 3);
        assert!(result.contains("<p>text</p>"));
    }

    #[test]
    fn linked_stylesheet_is_returned() {
        let site = Site::new();
        site.write("css/site.css", ".a{background-image:url(b.png)}");
        let document = site.document(
            "index.html",
            r#"<link rel="stylesheet" href="css/site.css"><img src="/i/x.png">"#,
        );

        let output = replace(&document, &site.options()).unwrap();

        assert_eq!(output.stylesheets.len(), 1);
        assert_eq!(output.stylesheets[0].path, site.path("css/site.css"));
        assert_eq!(
            String::from_utf8(output.stylesheets[0].contents.clone()).unwrap(),
            ".a{background-image:url(b.png)}html.webp .a{background-image:url(b.webp)}"
        );
        // 原文件不被修改
        assert_eq!(site.read("css/site.css"), ".a{background-image:url(b.png)}");
    }

    #[test]
    fn stylesheet_linked_twice_is_returned_once() {
        let site = Site::new();
        site.write("site.css", ".a{background:url(a.jpg)}");
        let document = site.document(
            "index.html",
            r#"<link rel="stylesheet" href="site.css"><link rel="stylesheet" href="/site.css">"#,
        );

        let output = replace(&document, &site.options()).unwrap();
        assert_eq!(output.stylesheets.len(), 1);
    }

    #[test]
    fn stylesheet_without_images_is_not_returned() {
        let site = Site::new();
        site.write("plain.css", "body{margin:0}");
        let document = site.document("index.html", r#"<link rel="stylesheet" href="plain.css">"#);

        let output = replace(&document, &site.options()).unwrap();
        assert!(output.stylesheets.is_empty());
        assert_eq!(output.document, document.contents);
    }

    #[test]
    fn inline_style_block() {
        let result = replace_str(
            "<style>\n.hero{background:url(/h.jpg) center}\n</style>",
            &WebpOptions::default(),
        );

        assert_eq!(
            result,
            "<style>\n.hero{background:url(/h.jpg) center}html.webp .hero{background-image:url(/h.webp)}\n</style>"
        );
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use webpify::core::{replace, WebpError};

    use crate::common::Site;

    #[test]
    fn missing_linked_stylesheet() {
        let site = Site::new();
        let document = site.document(
            "index.html",
            r#"<link rel="stylesheet" href="gone.css"><img src="a.png">"#,
        );

        let result = replace(&document, &site.options());
        match result {
            Err(WebpError::MissingFile { path, .. }) => assert_eq!(path, site.path("gone.css")),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn undecodable_document() {
        let site = Site::new();
        site.write("index.html", [0xC3u8, 0x28, b'<']);
        let document = webpify::core::Document::read(site.path("index.html")).unwrap();

        assert!(matches!(
            replace(&document, &site.options()),
            Err(WebpError::Encoding(_))
        ));
    }
}
