use bytes::{BufMut, Bytes, BytesMut};

/// Wire encoding capability for outbound Teltonika structures.
///
/// Implementors render themselves into a caller-provided buffer; the context
/// carries whatever codec-level state the layout depends on.
pub trait WireEncode {
    type Error: std::fmt::Debug + Send + Sync + 'static;
    type Context;

    /// Exact number of bytes [`encode_to`](WireEncode::encode_to) will write.
    fn encoded_len(&self, ctx: &Self::Context) -> usize;

    fn encode_to<B: BufMut>(&self, dst: &mut B, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Render into a freshly allocated, frozen buffer.
    fn encode_bytes(&self, ctx: &Self::Context) -> Result<Bytes, Self::Error> {
        let mut buf = BytesMut::with_capacity(self.encoded_len(ctx));
        self.encode_to(&mut buf, ctx)?;
        Ok(buf.freeze())
    }
}

/// Zero-copy wire decoding capability for inbound Teltonika structures.
pub trait WireDecode: Sized {
    type Error: std::fmt::Debug + Send + Sync + 'static;
    type Context;

    /// Parse one value from the front of `input`, returning the remaining
    /// slice and the parsed value. `parent` permits zero-copy
    /// `Bytes::slice_ref` construction when the decoded value keeps a view
    /// into the source buffer.
    fn parse<'a>(
        input: &'a [u8],
        parent: &Bytes,
        ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error>;
}
