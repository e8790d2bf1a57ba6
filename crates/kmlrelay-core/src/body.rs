use std::fmt;

use bytes::Bytes;
use std::pin::Pin;
use futures_util::stream::{Stream, StreamExt};

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, anyhow::Error>> + Send + Sync + 'static>>;

/// HTTP body carried through the relay: either a single `Bytes` buffer or a
/// streaming source of chunks. Upstream payloads are relayed as the streaming
/// variant so a response of any size passes through without being held in
/// memory.
pub enum Body {
    Once(Bytes),
    Stream(BodyStream),
}

impl Body {
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: Into<Bytes>,
    {
        Self::Once(bytes.into())
    }

    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        anyhow::Error: From<E>,
    {
        Self::Stream(Box::pin(stream.map(|res| res.map_err(anyhow::Error::from))))
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Bytes> + Send + Sync + 'static,
    {
        Self::Stream(Box::pin(stream.map(Ok::<Bytes, anyhow::Error>)))
    }

    pub fn text<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        Self::from_bytes(text.into().into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Once(bytes) => bytes.as_ref(),
            Body::Stream(_) => panic!("streaming body does not expose in-memory bytes"),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Body::Once(bytes) => bytes,
            Body::Stream(_) => panic!("streaming body cannot be converted into bytes"),
        }
    }

    pub fn into_stream(self) -> Option<BodyStream> {
        match self {
            Body::Once(_) => None,
            Body::Stream(stream) => Some(stream),
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Once(bytes) => f
                .debug_struct("Body::Once")
                .field("len", &bytes.len())
                .finish(),
            Body::Stream(_) => f.debug_tuple("Body::Stream").finish(),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::from_bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Body::from_bytes(Bytes::copy_from_slice(value))
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::text(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures_util::StreamExt;
    use std::io;

    #[test]
    fn collect_stream_body() {
        let body = Body::stream(futures_util::stream::iter(vec![
            Bytes::from_static(b"kml"),
            Bytes::from_static(b"-data"),
        ]));
        assert!(body.is_stream());
        let mut stream = body.into_stream().expect("stream");
        let collected = block_on(async {
            let mut data = Vec::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.expect("chunk");
                data.extend_from_slice(&chunk);
            }
            data
        });
        assert_eq!(collected, b"kml-data");
    }

    #[test]
    fn from_stream_maps_errors() {
        let stream = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"ok")),
            Err(io::Error::other("connection reset")),
        ]);
        let body = Body::from_stream(stream);
        let mut stream = body.into_stream().expect("stream");
        let (first, second) = block_on(async {
            let first = stream.next().await.expect("first").expect("ok");
            let second = stream.next().await.expect("second");
            (first, second)
        });
        assert_eq!(first, Bytes::from_static(b"ok"));
        let err = second.expect_err("error");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn into_stream_returns_none_for_buffered_body() {
        let body = Body::from("payload");
        assert!(body.into_stream().is_none());
        assert!(!Body::from("payload").is_stream());
    }

    #[test]
    fn default_body_is_empty() {
        let body = Body::default();
        assert!(body.as_bytes().is_empty());
    }

    #[test]
    fn debug_formats_both_variants() {
        assert!(format!("{:?}", Body::from("payload")).contains("Body::Once"));
        let stream = Body::stream(futures_util::stream::iter(vec![Bytes::from_static(b"c")]));
        assert!(format!("{:?}", stream).contains("Body::Stream"));
    }

    #[test]
    fn text_and_byte_constructors_agree() {
        assert_eq!(Body::text("abc").as_bytes(), b"abc");
        assert_eq!(Body::from(vec![1u8, 2u8]).as_bytes(), &[1u8, 2u8]);
        assert_eq!(Body::from(&b"xy"[..]).as_bytes(), b"xy");
        assert_eq!(Body::from(String::from("s")).into_bytes().as_ref(), b"s");
    }
}
