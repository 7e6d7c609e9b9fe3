//! Review-server trouble while the author publishes: expired tokens,
//! repeated rejections and outages.

#[cfg(test)]
mod tests {
    use papr_02_article_revisions::{ArticleError, ArticleRevisionApi};
    use shared_types::{Classified, ErrorKind};

    use crate::integration::world::World;

    async fn linked_world() -> World {
        let world = World::new().await;
        world.create("paper", false, Some("review")).await;
        world
    }

    #[tokio::test]
    async fn test_expired_tokens_are_renewed_transparently() {
        let world = linked_world().await;
        world
            .author
            .publish(world.revision("paper", 0, world.manuscript("p.pdf", b"%PDF"), false))
            .await
            .unwrap();
        assert_eq!(world.server.issued(), 1);

        world.server.expire_tokens();
        let outcome = world
            .author
            .publish(world.revision("paper", 1, world.manuscript("r1.pdf", b"%PDF r1"), false))
            .await
            .unwrap();

        assert!(outcome.warnings.is_empty());
        assert_eq!(world.server.issued(), 2);
        assert_eq!(world.server.received("/api/submit/").len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_rejection_is_a_warning_then_recovers() {
        let world = linked_world().await;
        world.server.reject_next(2);

        let first = world
            .author
            .publish(world.revision("paper", 0, world.manuscript("p.pdf", b"%PDF"), false))
            .await
            .unwrap();
        assert_eq!(first.warnings.len(), 1);
        assert!(!first.warnings[0].is_error());
        assert!(world.ledger.claim("paper_preprint").is_some());
        assert_eq!(world.server.issued(), 2);

        let second = world
            .author
            .publish(world.revision("paper", 1, world.manuscript("r1.pdf", b"%PDF r1"), false))
            .await
            .unwrap();
        assert!(second.warnings.is_empty());
        assert_eq!(world.server.issued(), 3);
    }

    #[tokio::test]
    async fn test_server_outage_during_submit_keeps_publication() {
        let world = linked_world().await;
        world.server.respond_with("/api/submit/", 503);

        let outcome = world
            .author
            .publish(world.revision("paper", 0, world.manuscript("p.pdf", b"%PDF"), false))
            .await
            .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(world.author.manuscripts("paper").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_refused_by_server_changes_nothing() {
        let world = linked_world().await;
        world
            .author
            .publish(world.revision("paper", 0, world.manuscript("p.pdf", b"%PDF"), false))
            .await
            .unwrap();
        world.server.respond_with("/api/accept", 500);

        let err = world.author.accept("paper").await.unwrap_err();
        assert!(matches!(err, ArticleError::Notification { .. }));
        assert_eq!(err.kind(), ErrorKind::Network);

        let article = world.author.article("paper").await.unwrap();
        assert!(!article.reviewed);
        assert_eq!(article.claim_name_for(1), "paper_r1");
    }
}
