//! The gRPC serving edge: translates between the generated `thunder.proto`
//! wire types and [`QueryService`]'s native request/response types, and maps
//! [`QueryServiceError`] onto `tonic::Status` codes.

use tonic::{Request, Response, Status};

use crate::proto::thunder_service_server::ThunderService as ThunderServiceTrait;
use crate::proto::{GetInNetworkPostsRequest, GetInNetworkPostsResponse, PostLight};
use crate::post::Post;
use crate::query_service::{InNetworkQuery, QueryService, QueryServiceError};

/// Implements the generated server trait over a [`QueryService`].
pub struct ThunderGrpcService {
    query_service: QueryService,
}

impl ThunderGrpcService {
    pub fn new(query_service: QueryService) -> Self {
        Self { query_service }
    }
}

#[tonic::async_trait]
impl ThunderServiceTrait for ThunderGrpcService {
    async fn get_in_network_posts(
        &self,
        request: Request<GetInNetworkPostsRequest>,
    ) -> Result<Response<GetInNetworkPostsResponse>, Status> {
        let req = request.into_inner();
        let query = InNetworkQuery {
            viewer_id: req.user_id,
            following_user_ids: req.following_user_ids,
            exclude_post_ids: req.exclude_tweet_ids,
            max_results: req.max_results,
            is_video_request: req.is_video_request,
            debug: req.debug,
        };

        let response = self
            .query_service
            .get_in_network_posts(query)
            .await
            .map_err(map_error)?;

        Ok(Response::new(GetInNetworkPostsResponse {
            posts: response.posts.iter().map(to_wire).collect(),
        }))
    }
}

fn to_wire(post: &Post) -> PostLight {
    PostLight {
        post_id: post.post_id,
        author_id: post.author_id,
        created_at: post.created_at,
        in_reply_to_post_id: post.in_reply_to_post_id,
        conversation_id: post.conversation_id,
        is_reply: post.is_reply,
        is_retweet: post.is_retweet,
        has_video: post.has_video,
        source_post_id: post.source_post_id,
        source_user_id: post.source_user_id,
    }
}

fn map_error(err: QueryServiceError) -> Status {
    match err {
        QueryServiceError::ResourceExhausted => Status::resource_exhausted(err.to_string()),
        QueryServiceError::Internal(_) => Status::internal(err.to_string()),
    }
}
