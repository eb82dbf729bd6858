//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::path::PathBuf;

    use webpify::core::{collect, WebpOptions};

    use crate::common::Site;

    #[test]
    fn one_artifact_per_reference() {
        let site = Site::new();
        site.write("img/a.png", b"A");
        site.write("img/b.jpg", b"B");
        let document = site.document(
            "index.html",
            r#"<img src="/img/a.png"><img src="img/b.jpg"><img src="/img/a.png">"#,
        );

        let collection = collect(&document, &site.options()).unwrap();

        let paths: Vec<PathBuf> = collection.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                site.path("img/a.png"),
                site.path("img/b.jpg"),
                site.path("img/a.png"),
            ]
        );
        assert_eq!(collection.artifacts[1].contents, b"B");
        assert!(collection.missing.is_empty());
    }

    #[test]
    fn ineligible_and_ignored_references_are_excluded() {
        let site = Site::new();
        site.write("a.png", b"A");
        site.write("b.svg", b"<svg/>");
        site.write("c.png", b"C");
        let document = site.document(
            "index.html",
            r#"<img src="a.png"><img src="b.svg"><img src="c.png" _nowebp>"#,
        );

        let collection = collect(&document, &site.options()).unwrap();
        assert_eq!(collection.artifacts.len(), 1);
        assert_eq!(collection.artifacts[0].path, site.path("a.png"));
    }

    #[test]
    fn missing_image_is_skipped() {
        let site = Site::new();
        site.write("a.png", b"A");
        let document = site.document("index.html", r#"<img src="gone.png"><img src="a.png">"#);

        let collection = collect(&document, &site.options()).unwrap();
        assert_eq!(collection.artifacts.len(), 1);
        assert_eq!(collection.missing, vec![site.path("gone.png")]);
    }

    #[test]
    fn output_base_rebases_paths() {
        let site = Site::new();
        site.write("static/img/a.png", b"A");
        let document = site.document("pages/index.html", r#"<img src="/static/img/a.png">"#);
        let options = WebpOptions {
            output_base: Some(site.path("out")),
            ..site.options()
        };

        let collection = collect(&document, &options).unwrap();
        assert_eq!(
            collection.artifacts[0].path,
            site.path("out/static/img/a.png")
        );
    }

    #[test]
    fn stylesheet_references_resolve_from_stylesheet_dir() {
        let site = Site::new();
        site.write("img/bg.png", b"BG");
        site.write("img/hero.jpg", b"HERO");
        site.write("css/site.css", ".a{background:url(../img/bg.png)}");
        let document = site.document(
            "index.html",
            concat!(
                r#"<link rel="stylesheet" href="css/site.css">"#,
                "<style>.b{background:url(img/hero.jpg)}</style>",
            ),
        );

        let collection = collect(&document, &site.options()).unwrap();
        let paths: Vec<PathBuf> = collection.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(paths, vec![site.path("img/bg.png"), site.path("img/hero.jpg")]);
    }

    #[test]
    fn percent_encoded_reference() {
        let site = Site::new();
        site.write("my photo.png", b"P");
        let document = site.document("index.html", r#"<img src="my%20photo.png">"#);

        let collection = collect(&document, &site.options()).unwrap();
        assert_eq!(collection.artifacts[0].path, site.path("my photo.png"));
    }

    #[test]
    fn missing_linked_stylesheet_is_recorded() {
        let site = Site::new();
        site.write("a.png", b"A");
        let document = site.document(
            "index.html",
            r#"<link rel="stylesheet" href="gone.css"><img src="a.png">"#,
        );

        let collection = collect(&document, &site.options()).unwrap();
        assert_eq!(collection.artifacts.len(), 1);
        assert_eq!(collection.missing, vec![site.path("gone.css")]);
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
    use webpify::core::{collect, Document, WebpError, WebpOptions};

    #[test]
    fn unknown_encoding() {
        let document = Document::new("index.html", r#"<img src="a.png">"#);
        let options = WebpOptions {
            encoding: Some("not-a-charset".to_string()),
            ..WebpOptions::default()
        };

        assert!(matches!(
            collect(&document, &options),
            Err(WebpError::Config(_))
        ));
    }
}
