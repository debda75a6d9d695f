// Chunked JSON streaming utilities
use crate::application::streaming_service::StreamMessage;
use crate::domain::coordinates::CoordinateFormat;
use crate::infrastructure::http_response::brotli_compress;
use crate::infrastructure::json_mapper::stream_message_to_view;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

/// Create a chunked JSON streaming response
pub async fn chunked_json_stream<S>(
    stream: S,
    format: CoordinateFormat,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream =
        stream.then(move |msg| async move { serialize_chunk(msg, format, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// One chunk: u32 big-endian payload length followed by the (optionally
/// Brotli-compressed) JSON payload
async fn serialize_chunk(
    msg: StreamMessage,
    format: CoordinateFormat,
    compress: bool,
) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&stream_message_to_view(msg, format))?;

    let payload = if compress {
        brotli_compress(&json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<StreamMessage>,
    format: CoordinateFormat,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, format, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::Unit;
    use crate::domain::speedometer::SpeedometerState;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed_json() {
        let msg = StreamMessage::Update(SpeedometerState::new(Unit::MilesPerHour, None));
        let chunk = serialize_chunk(msg, CoordinateFormat::Decimal, false)
            .await
            .unwrap();

        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);

        let json: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["state"]["abbreviation"], "mph");
    }

    #[tokio::test]
    async fn test_stream_response_headers() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(tx);

        let response = stream_from_receiver(rx, CoordinateFormat::default(), true)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::TRANSFER_ENCODING], "chunked");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }
}
